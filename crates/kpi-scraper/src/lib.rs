pub mod driver;
pub mod error;
pub mod extract;
pub mod locator;
pub mod normalize;
pub mod session;
pub mod webdriver;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use driver::{scrape_kpis, Driver};
pub use error::{DriverError, LocatorError, NormalizeError, ScraperError};
pub use extract::{RawCell, RawGrid};
pub use locator::{CellLocators, Locator, LocatorKind, LocatorMap};
pub use normalize::{format_numeric, normalize_cell, normalize_grid, translate_weekday};
pub use session::{AuthStage, DashboardSession, SessionSettings};
pub use webdriver::WebDriverSession;
