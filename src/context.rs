//! Application state
//!
//! One ledger and one wallet book, owned together and handed to whatever
//! drives them (the CLI, a transport layer, tests).

use crate::core::{Amount, LedgerConfig, SharedLedger, Transaction, GENESIS_SOURCE};
use crate::wallet::{Wallet, WalletBook, WalletError};
use log::{error, info, warn};

pub const MINER_WALLET: &str = "minerWallet";
pub const USER_A_WALLET: &str = "walletUserA";
pub const USER_B_WALLET: &str = "walletUserB";

/// Genesis credit given to the miner wallet in the seeded scenario
pub const GENESIS_CREDIT: Amount = Amount::from_coins(3000);

/// Shared application state
#[derive(Clone)]
pub struct AppContext {
    pub ledger: SharedLedger,
    pub wallets: WalletBook,
}

impl AppContext {
    /// Empty context over a fresh ledger with an empty genesis block
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            ledger: SharedLedger::new(vec![], config),
            wallets: WalletBook::new(),
        }
    }

    /// Build the bootstrap scenario: three wallets, a 3000 genesis credit to
    /// the miner wallet, then two signed transfers each sealed in its own
    /// block (miner to B for 1000, B to A for 100).
    ///
    /// Fails if either transfer is refused; a partly seeded ledger is never
    /// returned.
    pub fn seeded(config: LedgerConfig) -> Result<Self, WalletError> {
        Self::seeded_with_credit(config, GENESIS_CREDIT)
    }

    /// [`AppContext::seeded`] with a different genesis credit
    pub fn seeded_with_credit(config: LedgerConfig, credit: Amount) -> Result<Self, WalletError> {
        let mut wallets = WalletBook::new();
        let miner = wallets.insert(MINER_WALLET, Wallet::new())?.clone();
        let user_a = wallets.insert(USER_A_WALLET, Wallet::new())?.clone();
        let user_b = wallets.insert(USER_B_WALLET, Wallet::new())?.clone();

        let genesis = vec![Transaction::new(
            GENESIS_SOURCE,
            miner.address(),
            credit,
        )];
        let ledger = SharedLedger::new(genesis, config);
        ledger.mine_once();

        if let Err(e) = submit_signed(&ledger, &miner, user_b.address(), Amount::from_coins(1000)) {
            error!("Seeding failed at miner -> B: {}", e);
            return Err(e);
        }
        ledger.mine_once();

        if let Err(e) = submit_signed(&ledger, &user_b, user_a.address(), Amount::from_coins(100)) {
            error!("Seeding failed at B -> A: {}", e);
            return Err(e);
        }
        ledger.mine_once();

        info!(
            "Seeded ledger at height {}: A {} B {} M {}",
            ledger.height(),
            ledger.balance_of(user_a.address()),
            ledger.balance_of(user_b.address()),
            ledger.balance_of(miner.address())
        );

        Ok(Self { ledger, wallets })
    }

    /// Sign and submit a transfer between two named wallets
    pub fn transfer_between(&self, from: &str, to: &str, value: Amount) -> Result<bool, WalletError> {
        let sender = self.wallets.get(from)?;
        let recipient = self.wallets.get(to)?;
        transfer(&self.ledger, sender, recipient.address(), value)
    }
}

fn submit_signed(
    ledger: &SharedLedger,
    sender: &Wallet,
    recipient: &str,
    value: Amount,
) -> Result<(), WalletError> {
    let signature = sender.sign(recipient, value)?;
    ledger.submit_transaction(
        sender.address(),
        recipient,
        value,
        Some(sender.public_key()),
        Some(&signature),
    )?;
    Ok(())
}

fn transfer(
    ledger: &SharedLedger,
    sender: &Wallet,
    recipient: &str,
    value: Amount,
) -> Result<bool, WalletError> {
    match submit_signed(ledger, sender, recipient, value) {
        Ok(()) => Ok(true),
        Err(WalletError::Rejected(e)) => {
            warn!("Transfer from {} rejected: {}", sender.address(), e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
