//! [`Driver`] backed by a WebDriver endpoint (chromedriver) via `fantoccini`.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

use crate::driver::Driver;
use crate::error::DriverError;
use crate::locator::Locator;

pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Starts a Chrome session on the WebDriver server at `webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Connect`] if the server is unreachable or
    /// refuses to create a session.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        tracing::info!(webdriver_url, headless, "starting browser session");
        let client = ClientBuilder::rustls()
            .capabilities(chrome_capabilities(headless))
            .connect(webdriver_url)
            .await
            .map_err(|e| DriverError::Connect {
                url: webdriver_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

/// Chrome options for unattended runs on a server without a display.
pub(crate) fn chrome_capabilities(headless: bool) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
    if headless {
        args.push("--headless=new");
        args.push("--disable-gpu");
    }
    let mut caps = serde_json::Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

fn command_error(err: CmdError, locator: Option<&Locator>, timeout: Duration) -> DriverError {
    match (err, locator) {
        (CmdError::WaitTimeout, Some(locator)) => DriverError::Timeout {
            locator: locator.to_string(),
            timeout_secs: timeout.as_secs(),
        },
        (err, Some(locator)) if err.is_no_such_element() => DriverError::NoSuchElement {
            locator: locator.to_string(),
        },
        (err, _) => DriverError::Command(err.to_string()),
    }
}

fn plain(err: CmdError) -> DriverError {
    command_error(err, None, Duration::ZERO)
}

#[async_trait]
impl Driver for WebDriverSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(plain)
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(locator.as_fantoccini())
            .await
            .map_err(|e| command_error(e, Some(locator), timeout))
    }

    async fn clear(&mut self, element: &Self::Element) -> Result<(), DriverError> {
        element.clear().await.map_err(plain)
    }

    async fn type_into(&mut self, element: &Self::Element, text: &str) -> Result<(), DriverError> {
        element.send_keys(text).await.map_err(plain)
    }

    async fn click(&mut self, element: &Self::Element) -> Result<(), DriverError> {
        element.click().await.map_err(plain)
    }

    async fn text(&mut self, element: &Self::Element) -> Result<String, DriverError> {
        element.text().await.map_err(plain)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.client.clone().close().await.map_err(plain)
    }
}
