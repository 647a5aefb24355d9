use std::str::FromStr;
use std::sync::Arc;

use metrics::counter;
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::db::CopyStore;
use crate::errors::BotError;
use crate::execution::position_sizer::{to_smallest_unit, validate_amount, validate_percentage};
use crate::execution::SwapExecutor;
use crate::ingestion::SubscriptionRegistry;
use crate::models::{short_address, TradeAction, User, NATIVE_DECIMALS, NATIVE_MINT};
use crate::services::notifier;
use crate::solana::{
    lamports_to_sol, validate_target_wallet, validate_token_mint, wallet_holdings, CustodialWallet,
};

use super::context::ChatContext;
use super::input::{MenuAction, UserInput};
use super::menus;
use super::state::{ConversationState, ConversationStates};

/// Choice lists and defaults offered by the dialogs.
#[derive(Debug, Clone)]
pub struct DialogSettings {
    pub buy_amount_choices: Vec<Decimal>,
    pub percent_choices: Vec<Decimal>,
    pub default_max_trade: Decimal,
}

impl DialogSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            buy_amount_choices: config.buy_amount_choices.clone(),
            percent_choices: config.percent_choices.clone(),
            default_max_trade: config.default_max_trade_sol,
        }
    }
}

/// Drives every chat through its dialog. One instance serves all chats;
/// state is isolated per chat id.
pub struct ConversationService {
    store: Arc<dyn CopyStore>,
    swaps: Arc<SwapExecutor>,
    registry: Arc<SubscriptionRegistry>,
    states: ConversationStates,
    settings: DialogSettings,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn CopyStore>,
        swaps: Arc<SwapExecutor>,
        registry: Arc<SubscriptionRegistry>,
        settings: DialogSettings,
    ) -> Self {
        Self {
            store,
            swaps,
            registry,
            states: ConversationStates::new(),
            settings,
        }
    }

    pub fn state(&self, chat_id: i64) -> ConversationState {
        self.states.get(chat_id)
    }

    pub fn states(&self) -> &ConversationStates {
        &self.states
    }

    /// Callback boundary: nothing raised by a dialog step escapes. A failed
    /// step resets the chat to `Idle` and sends one error line.
    pub async fn handle(&self, ctx: &dyn ChatContext, input: UserInput) {
        let chat_id = ctx.chat_id();

        if let Err(e) = ctx.acknowledge_callback().await {
            tracing::debug!(chat_id, error = %e, "Failed to acknowledge callback");
        }

        if let Err(e) = self.dispatch(ctx, input).await {
            tracing::warn!(chat_id, error = %e, "Dialog step failed, resetting");
            self.states.reset(chat_id);
            let report = notifier::escape_markdown(&e.user_message());
            if let Err(send_err) = ctx.send_text(&report, None).await {
                tracing::error!(chat_id, error = %send_err, "Failed to report dialog error");
            }
        }
    }

    async fn dispatch(&self, ctx: &dyn ChatContext, input: UserInput) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();

        match input {
            UserInput::Start => self.start(ctx).await,
            UserInput::Menu(action) => self.select(ctx, action).await,
            UserInput::BuyAmount(amount) => match self.states.get(chat_id) {
                ConversationState::AwaitingAmount { token_mint } => {
                    self.buy(ctx, &token_mint, amount).await
                }
                _ => self.stale_selection(ctx).await,
            },
            UserInput::SellPercentage(pct) => match self.states.get(chat_id) {
                ConversationState::AwaitingPercentage {
                    token_mint,
                    token_amount,
                    token_decimals,
                } => {
                    self.sell(ctx, &token_mint, token_amount, token_decimals, pct)
                        .await
                }
                _ => self.stale_selection(ctx).await,
            },
            UserInput::CopyPercentage(pct) => match self.states.get(chat_id) {
                ConversationState::AwaitingCopyPercentage { target_wallet } => {
                    self.start_copying(ctx, &target_wallet, pct).await
                }
                _ => self.stale_selection(ctx).await,
            },
            UserInput::Text(text) => self.text(ctx, &text).await,
        }
    }

    // -- Menu -----------------------------------------------------------------

    async fn start(&self, ctx: &dyn ChatContext) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();
        self.states.reset(chat_id);

        if let Some(user) = self.store.find_user_by_chat(chat_id).await? {
            let msg = format!(
                "👋 Welcome back! You already have a wallet.\n\n🔑 Public key: `{}`",
                user.public_key
            );
            return ctx.send_text(&msg, Some(&menus::main_menu())).await;
        }

        let (public_key, private_key) = CustodialWallet::generate();
        let user = self
            .store
            .create_user(chat_id, &public_key, &private_key)
            .await?;
        tracing::info!(chat_id, user = %user.id, "Created custodial wallet");

        let msg = format!(
            "🎉 *Welcome to Copybot!*\n\nA new Solana wallet was created for you.\n\n🔑 Public key: `{}`\n\nFund it with SOL to start trading.",
            user.public_key
        );
        ctx.send_text(&msg, Some(&menus::main_menu())).await
    }

    async fn select(&self, ctx: &dyn ChatContext, action: MenuAction) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();

        match action {
            MenuAction::Cancel => {
                self.states.reset(chat_id);
                ctx.send_text("✅ Operation cancelled.", Some(&menus::main_menu()))
                    .await
            }
            MenuAction::StopCopying => self.stop_copying(ctx).await,
            MenuAction::Buy | MenuAction::Sell => {
                self.require_user(chat_id).await?;
                let trade = if action == MenuAction::Buy {
                    TradeAction::Buy
                } else {
                    TradeAction::Sell
                };
                self.states
                    .set(chat_id, ConversationState::AwaitingToken { action: trade });
                let msg = format!("🪙 Enter the token mint address you want to {trade}:");
                ctx.send_text(&msg, Some(&menus::cancel_menu())).await
            }
            MenuAction::Copy => {
                self.require_user(chat_id).await?;
                self.states.set(chat_id, ConversationState::AwaitingWallet);
                ctx.send_text(
                    "👥 Enter the wallet address you want to copy:",
                    Some(&menus::cancel_menu()),
                )
                .await
            }
            MenuAction::PublicKey => {
                let user = self.require_user(chat_id).await?;
                let msg = format!("🔑 Your public key:\n`{}`", user.public_key);
                ctx.send_text(&msg, None).await
            }
            MenuAction::PrivateKey => {
                let user = self.require_user(chat_id).await?;
                let msg = format!(
                    "🔐 Your private key:\n`{}`\n\n⚠️ Never share it with anyone.",
                    user.private_key
                );
                ctx.send_text(&msg, None).await
            }
            MenuAction::Balance => {
                let user = self.require_user(chat_id).await?;
                let owner = CustodialWallet::from_user(&user).pubkey()?;
                let lamports = self.swaps.chain().get_balance(&owner).await?;
                let msg = format!("💰 Balance: {} SOL", lamports_to_sol(lamports).normalize());
                ctx.send_text(&msg, None).await
            }
        }
    }

    // -- Free text ------------------------------------------------------------

    async fn text(&self, ctx: &dyn ChatContext, text: &str) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();

        match self.states.get(chat_id) {
            ConversationState::Idle => {
                ctx.send_text("Please choose an option:", Some(&menus::main_menu()))
                    .await
            }
            ConversationState::AwaitingToken {
                action: TradeAction::Buy,
            } => self.buy_token_entered(ctx, text).await,
            ConversationState::AwaitingToken {
                action: TradeAction::Sell,
            } => self.sell_token_entered(ctx, text).await,
            ConversationState::AwaitingAmount { token_mint } => match parse_number(text) {
                Ok(amount) => self.buy(ctx, &token_mint, amount).await,
                Err(e) => self.retry(ctx, &e).await,
            },
            ConversationState::AwaitingPercentage {
                token_mint,
                token_amount,
                token_decimals,
            } => match parse_number(text) {
                Ok(pct) => {
                    self.sell(ctx, &token_mint, token_amount, token_decimals, pct)
                        .await
                }
                Err(e) => self.retry(ctx, &e).await,
            },
            ConversationState::AwaitingWallet => self.wallet_entered(ctx, text).await,
            ConversationState::AwaitingCopyPercentage { target_wallet } => {
                match parse_number(text) {
                    Ok(pct) => self.start_copying(ctx, &target_wallet, pct).await,
                    Err(e) => self.retry(ctx, &e).await,
                }
            }
        }
    }

    async fn buy_token_entered(&self, ctx: &dyn ChatContext, text: &str) -> Result<(), BotError> {
        let mint = match validate_token_mint(self.swaps.chain().as_ref(), text).await {
            Ok(mint) => mint,
            Err(e) => return self.retry(ctx, &e).await,
        };

        self.states.set(
            ctx.chat_id(),
            ConversationState::AwaitingAmount {
                token_mint: mint.to_string(),
            },
        );

        let kb = menus::buy_amount_menu(&self.settings.buy_amount_choices);
        ctx.send_text("💵 How much SOL do you want to spend?", Some(&kb))
            .await
    }

    async fn sell_token_entered(&self, ctx: &dyn ChatContext, text: &str) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();
        let user = self.require_user(chat_id).await?;
        let owner = CustodialWallet::from_user(&user).pubkey()?;
        let holdings = wallet_holdings(self.swaps.chain().as_ref(), &owner).await?;

        let mint = text.trim();
        let Some(holding) = holdings
            .into_iter()
            .find(|h| h.mint == mint && h.amount > Decimal::ZERO)
        else {
            // Not retried: the sell flow ends here
            self.states.reset(chat_id);
            return ctx
                .send_text(
                    "❌ You don't hold this token.",
                    Some(&menus::main_menu()),
                )
                .await;
        };

        let msg = format!(
            "📊 You hold {} of this token. What percentage do you want to sell?",
            holding.amount.normalize()
        );
        self.states.set(
            chat_id,
            ConversationState::AwaitingPercentage {
                token_mint: holding.mint,
                token_amount: holding.amount,
                token_decimals: holding.decimals,
            },
        );

        let kb = menus::sell_percent_menu(&self.settings.percent_choices);
        ctx.send_text(&msg, Some(&kb)).await
    }

    async fn wallet_entered(&self, ctx: &dyn ChatContext, text: &str) -> Result<(), BotError> {
        let user = self.require_user(ctx.chat_id()).await?;

        let target =
            match validate_target_wallet(self.swaps.chain().as_ref(), text, &user.public_key).await
            {
                Ok(target) => target,
                Err(e) => return self.retry(ctx, &e).await,
            };

        self.states.set(
            ctx.chat_id(),
            ConversationState::AwaitingCopyPercentage {
                target_wallet: target.to_string(),
            },
        );

        let msg = format!(
            "✅ Wallet `{}` looks good.\n\n📊 What percentage of each trade do you want to copy?",
            short_address(&target.to_string())
        );
        let kb = menus::copy_percent_menu(&self.settings.percent_choices);
        ctx.send_text(&msg, Some(&kb)).await
    }

    // -- Completions ----------------------------------------------------------

    async fn buy(&self, ctx: &dyn ChatContext, mint: &str, amount: Decimal) -> Result<(), BotError> {
        if let Err(e) = validate_amount(amount) {
            return self.retry(ctx, &e).await;
        }

        let chat_id = ctx.chat_id();
        self.states.reset(chat_id);
        let user = self.require_user(chat_id).await?;
        let units = to_smallest_unit(amount, NATIVE_DECIMALS)?;

        ctx.send_text(
            &format!("⏳ Buying with {} SOL...", amount.normalize()),
            None,
        )
        .await?;

        self.manual_trade(ctx, &user, TradeAction::Buy, NATIVE_MINT, mint, units)
            .await
    }

    async fn sell(
        &self,
        ctx: &dyn ChatContext,
        mint: &str,
        token_amount: Decimal,
        token_decimals: u8,
        percentage: Decimal,
    ) -> Result<(), BotError> {
        if let Err(e) = validate_percentage(percentage) {
            return self.retry(ctx, &e).await;
        }

        let chat_id = ctx.chat_id();
        self.states.reset(chat_id);
        let user = self.require_user(chat_id).await?;

        let amount = token_amount * percentage / Decimal::ONE_HUNDRED;
        let units = to_smallest_unit(amount, token_decimals)?;

        ctx.send_text(
            &format!("⏳ Selling {}% of your position...", percentage.normalize()),
            None,
        )
        .await?;

        self.manual_trade(ctx, &user, TradeAction::Sell, mint, NATIVE_MINT, units)
            .await
    }

    async fn manual_trade(
        &self,
        ctx: &dyn ChatContext,
        user: &User,
        action: TradeAction,
        input_mint: &str,
        output_mint: &str,
        units: u64,
    ) -> Result<(), BotError> {
        let label = match action {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
        };
        let wallet = CustodialWallet::from_user(user);

        let msg = match self.swaps.swap(&wallet, input_mint, output_mint, units).await {
            Ok(signature) => {
                counter!("manual_trades_total", "action" => action.to_string()).increment(1);
                tracing::info!(user = %user.id, %action, signature = %signature, "Manual trade submitted");
                notifier::format_manual_trade_success(label, &signature.to_string())
            }
            Err(e) => {
                tracing::error!(user = %user.id, %action, error = %e, "Manual trade failed");
                notifier::format_manual_trade_failure(label, &e.to_string())
            }
        };

        ctx.send_text(&msg, Some(&menus::main_menu())).await
    }

    async fn start_copying(
        &self,
        ctx: &dyn ChatContext,
        target: &str,
        percentage: Decimal,
    ) -> Result<(), BotError> {
        if let Err(e) = validate_percentage(percentage) {
            return self.retry(ctx, &e).await;
        }

        let chat_id = ctx.chat_id();
        self.states.reset(chat_id);
        let user = self.require_user(chat_id).await?;

        self.store.upsert_target(user.id, target).await?;
        let settings = self
            .store
            .upsert_copy_settings(user.id, percentage, self.settings.default_max_trade)
            .await?;

        if let Err(e) = self.registry.start_monitoring(target, user.id).await {
            tracing::error!(address = %target, error = %e, "Failed to start monitoring");
            let msg = format!(
                "⚠️ Copy settings saved, but monitoring `{}` could not start.\n\n{}",
                short_address(target),
                notifier::escape_markdown(&e.user_message())
            );
            return ctx.send_text(&msg, Some(&menus::main_menu())).await;
        }

        tracing::info!(user = %user.id, address = %target, %percentage, "Copy trading started");
        let msg = format!(
            "✅ *Copy trading started!*\n\n👤 Target: `{}`\n📊 Percentage: {}%\n💰 Max per trade: {} SOL",
            short_address(target),
            settings.copy_percentage.normalize(),
            settings.max_trade_amount.normalize(),
        );
        ctx.send_text(&msg, Some(&menus::main_menu())).await
    }

    async fn stop_copying(&self, ctx: &dyn ChatContext) -> Result<(), BotError> {
        let chat_id = ctx.chat_id();
        self.states.reset(chat_id);
        let user = self.require_user(chat_id).await?;

        let targets = self.store.active_targets_for_user(user.id).await?;
        if targets.is_empty() {
            return ctx
                .send_text(
                    "ℹ️ You are not copying any wallets.",
                    Some(&menus::main_menu()),
                )
                .await;
        }

        for target in &targets {
            self.store.deactivate_target(user.id, &target.address).await?;
            self.registry.release_follower(&target.address, user.id).await;
        }
        self.store.disable_copy_settings(user.id).await?;

        tracing::info!(user = %user.id, targets = targets.len(), "Copy trading stopped");
        let msg = format!(
            "🛑 Copy trading stopped for {} wallet(s).",
            targets.len()
        );
        ctx.send_text(&msg, Some(&menus::main_menu())).await
    }

    // -- Helpers --------------------------------------------------------------

    async fn require_user(&self, chat_id: i64) -> Result<User, BotError> {
        self.store
            .find_user_by_chat(chat_id)
            .await?
            .ok_or_else(|| BotError::NotFound("No wallet found. Use /start to create one.".into()))
    }

    /// Report a bad entry and keep the current state so the user can retry.
    async fn retry(&self, ctx: &dyn ChatContext, error: &BotError) -> Result<(), BotError> {
        tracing::debug!(chat_id = ctx.chat_id(), error = %error, "Rejected dialog input");
        ctx.send_text(&notifier::escape_markdown(&error.user_message()), None).await
    }

    async fn stale_selection(&self, ctx: &dyn ChatContext) -> Result<(), BotError> {
        ctx.send_text(
            "⌛ That selection has expired. Please start again.",
            Some(&menus::main_menu()),
        )
        .await
    }
}

fn parse_number(text: &str) -> Result<Decimal, BotError> {
    let cleaned = text.trim().trim_end_matches('%').trim();
    Decimal::from_str(cleaned)
        .map_err(|_| BotError::Validation(format!("'{}' is not a number", text.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 0.5 ").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_number("50%").unwrap(), Decimal::from(50));
        assert!(matches!(parse_number("half"), Err(BotError::Validation(_))));
    }
}
