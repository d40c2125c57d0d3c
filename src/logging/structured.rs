use tracing::{debug, error, info, warn};

/// Context information for log messages
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "service", "client", "web")
    pub component: String,
    /// Request ID for correlating the two forecast runs of one inbound call
    pub request_id: Option<String>,
    /// Additional context fields
    pub extra_fields: std::collections::BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            request_id: None,
            extra_fields: std::collections::BTreeMap::new(),
        }
    }

    /// Set request ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add extra field
    pub fn with_field(mut self, key: &str, value: String) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    /// Create a new structured logger with context
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    /// Log an info message with context
    pub fn info(&self, message: &str) {
        let fields = self.format_fields();
        info!(%fields, "{}", message);
    }
    /// Log a warning message with context
    pub fn warn(&self, message: &str) {
        let fields = self.format_fields();
        warn!(%fields, "{}", message);
    }
    /// Log an error message with context
    pub fn error(&self, message: &str) {
        let fields = self.format_fields();
        error!(%fields, "{}", message);
    }
    /// Log a debug message with context
    pub fn debug(&self, message: &str) {
        let fields = self.format_fields();
        debug!(%fields, "{}", message);
    }

    /// Format context fields for logging
    pub(crate) fn format_fields(&self) -> String {
        let mut fields = vec![format!("component={}", self.context.component)];
        if let Some(ref request_id) = self.context.request_id {
            fields.push(format!("request_id={}", request_id));
        }
        for (key, value) in &self.context.extra_fields {
            fields.push(format!("{}={}", key, value));
        }
        fields.join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}
/// Create a logger with full context
pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context() {
        let context = LogContext::new("test")
            .with_request_id("req_123".to_string())
            .with_field("scenario", "baseline".to_string());

        assert_eq!(context.component, "test");
        assert_eq!(context.request_id, Some("req_123".to_string()));
        assert_eq!(
            context.extra_fields.get("scenario"),
            Some(&"baseline".to_string())
        );
    }

    #[test]
    fn test_format_fields_order() {
        let logger = get_logger_with_context(
            LogContext::new("service")
                .with_request_id("abc".to_string())
                .with_field("scenario", "action".to_string())
                .with_field("address", "x".to_string()),
        );
        assert_eq!(
            logger.format_fields(),
            "component=service,request_id=abc,address=x,scenario=action"
        );
    }

    #[test]
    fn test_get_logger() {
        let logger = get_logger("test_component");
        assert_eq!(logger.context.component, "test_component");
    }
}
