use crate::domain::errors::WidgetError;

/// Every place the page can tell us who the customer is, passed in
/// explicitly instead of being looked up from page globals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerContext {
    /// Email configured for the widget itself (`customerEmail` of the page
    /// context, or the service default).
    pub configured_email: Option<String>,
    /// `customer.email` from the page context.
    pub customer_email: Option<String>,
    /// Email from the global customer data object.
    pub customer_data_email: Option<String>,
    /// `data-customer-email` of the hidden customer id field.
    pub hidden_field_email: Option<String>,
    /// Any element's `data-customer-email` attribute.
    pub data_email: Option<String>,
}

impl CustomerContext {
    /// Fills the configured slot from the service default when the page did
    /// not provide one.
    pub fn with_default_email(mut self, email: Option<&str>) -> Self {
        if self.configured_email.is_none() {
            self.configured_email = email.map(str::to_string);
        }
        self
    }

    /// First non-empty identifier in precedence order: configured, context
    /// customer, global customer data, hidden field, data attribute.
    pub fn resolve(&self) -> Result<String, WidgetError> {
        [
            ("configured", &self.configured_email),
            ("context customer", &self.customer_email),
            ("customer data", &self.customer_data_email),
            ("hidden field", &self.hidden_field_email),
            ("data attribute", &self.data_email),
        ]
        .into_iter()
        .find_map(|(source, value)| {
            let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
            log::debug!("Customer identifier resolved from {source}");
            Some(value.to_string())
        })
        .ok_or_else(|| {
            log::error!("No customer email found in configuration, page context or page fields");
            WidgetError::Identity
        })
    }
}
