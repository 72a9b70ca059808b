pub mod balances;
pub mod constants;
pub mod currencies;
pub mod db;
pub mod errors;
pub mod exchanges;
pub mod external_ops;
pub mod ledger;
pub mod locations;
pub mod reconciliation;
pub mod schema;
pub mod transfers;

pub use errors::{Error, Result};

pub use balances::{Balance, BalanceService, InitialBalance};
pub use currencies::{Currency, CurrencyService, NewCurrency};
pub use exchanges::{Exchange, ExchangeService, NewExchange};
pub use external_ops::{ExternalOperation, ExternalOperationService, NewExternalOperation};
pub use ledger::{Movement, MovementKind, MovementQuery, NewAdjustment, SettlementChannel};
pub use ledger::LedgerService;
pub use locations::{Location, LocationService, NewLocation};
pub use reconciliation::{PairReport, ReconciliationService, ReconciliationSummary};
pub use transfers::{NewTransfer, Transfer, TransferService, TransferStatus};
