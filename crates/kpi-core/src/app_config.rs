use std::path::PathBuf;

/// Static labels printed in the report title and note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    pub project_name: String,
    pub server_label: String,
    pub currency: String,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            project_name: "PJ_HC".to_string(),
            server_label: "JP".to_string(),
            currency: "KRW".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub site_url: String,
    pub login_username: String,
    pub login_password: String,
    /// Sender address, also the SMTP login.
    pub sender_address: String,
    pub recipient_address: String,
    pub extra_recipient_address: Option<String>,
    pub email_password: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub element_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub log_level: String,
    pub locators_path: Option<PathBuf>,
    pub report: ReportMeta,
}

impl AppConfig {
    /// Recipients in send order: the primary address, then the optional extra one.
    #[must_use]
    pub fn recipients(&self) -> Vec<&str> {
        std::iter::once(self.recipient_address.as_str())
            .chain(self.extra_recipient_address.as_deref())
            .collect()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("site_url", &self.site_url)
            .field("login_username", &"[redacted]")
            .field("login_password", &"[redacted]")
            .field("sender_address", &self.sender_address)
            .field("recipient_address", &self.recipient_address)
            .field("extra_recipient_address", &self.extra_recipient_address)
            .field("email_password", &"[redacted]")
            .field("webdriver_url", &self.webdriver_url)
            .field("headless", &self.headless)
            .field("element_timeout_secs", &self.element_timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("log_level", &self.log_level)
            .field("locators_path", &self.locators_path)
            .field("report", &self.report)
            .finish()
    }
}
