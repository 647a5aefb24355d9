use rust_decimal::Decimal;

use super::context::{Button, Keyboard};
use super::input::{
    CB_BALANCE, CB_BUY, CB_BUY_AMOUNT, CB_CANCEL, CB_COPY, CB_COPY_PCT, CB_PRIVATE, CB_PUBLIC,
    CB_SELL, CB_SELL_PCT, CB_STOP_COPY,
};

pub fn main_menu() -> Keyboard {
    Keyboard::default()
        .row(vec![Button::new("🟢 Buy", CB_BUY), Button::new("🔴 Sell", CB_SELL)])
        .row(vec![
            Button::new("👥 Copy Trade", CB_COPY),
            Button::new("🛑 Stop Copying", CB_STOP_COPY),
        ])
        .row(vec![
            Button::new("🔑 Public Key", CB_PUBLIC),
            Button::new("🔐 Private Key", CB_PRIVATE),
        ])
        .row(vec![Button::new("💰 Balance", CB_BALANCE)])
}

fn cancel_row() -> Vec<Button> {
    vec![Button::new("❌ Cancel", CB_CANCEL)]
}

pub fn cancel_menu() -> Keyboard {
    Keyboard::default().row(cancel_row())
}

pub fn buy_amount_menu(choices: &[Decimal]) -> Keyboard {
    let buttons = choices
        .iter()
        .map(|a| {
            let a = a.normalize();
            Button::new(format!("{a} SOL"), format!("{CB_BUY_AMOUNT}{a}"))
        })
        .collect();
    Keyboard::default().row(buttons).row(cancel_row())
}

fn percent_menu(choices: &[Decimal], prefix: &str) -> Keyboard {
    let buttons = choices
        .iter()
        .map(|p| {
            let p = p.normalize();
            Button::new(format!("{p}%"), format!("{prefix}{p}"))
        })
        .collect();
    Keyboard::default().row(buttons).row(cancel_row())
}

pub fn sell_percent_menu(choices: &[Decimal]) -> Keyboard {
    percent_menu(choices, CB_SELL_PCT)
}

pub fn copy_percent_menu(choices: &[Decimal]) -> Keyboard {
    percent_menu(choices, CB_COPY_PCT)
}
