//! Configuration for the pooled tool executor.

/// Configuration for [`crate::PooledExecutor`].
///
/// The defaults reproduce the reference deployment: the `cf` CLI, isolated
/// per run through `CF_HOME`, at most four concurrent invocations, 10 KiB of
/// retained output, and the tool's own parallelism capped via `GOMAXPROCS`.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Binary invoked for every execution.
    pub tool: String,
    /// Environment variable the tool consults for its private state directory.
    pub home_env: String,
    /// Number of isolated home directories provisioned at startup.
    pub pool_size: usize,
    /// Capacity of the per-execution output capture buffer, in bytes.
    pub capture_capacity: usize,
    /// Fixed environment applied to every invocation, e.g. a parallelism cap.
    pub fixed_env: Vec<(String, String)>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tool: "cf".to_string(),
            home_env: "CF_HOME".to_string(),
            pool_size: 4,
            capture_capacity: 10 * 1024,
            fixed_env: vec![("GOMAXPROCS".to_string(), "4".to_string())],
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration for the given tool binary.
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ..Self::default()
        }
    }

    /// Set the environment variable used to redirect the tool's home.
    pub fn with_home_env(mut self, var: impl Into<String>) -> Self {
        self.home_env = var.into();
        self
    }

    /// Set the number of pooled home directories.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the output capture capacity in bytes.
    pub fn with_capture_capacity(mut self, bytes: usize) -> Self {
        self.capture_capacity = bytes;
        self
    }

    /// Add a fixed environment variable applied to every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_env.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = ExecutorConfig::default();
        assert_eq!(config.tool, "cf");
        assert_eq!(config.home_env, "CF_HOME");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.capture_capacity, 10 * 1024);
        assert_eq!(
            config.fixed_env,
            vec![("GOMAXPROCS".to_string(), "4".to_string())]
        );
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = ExecutorConfig::new("mytool")
            .with_home_env("MYTOOL_HOME")
            .with_pool_size(2)
            .with_capture_capacity(512)
            .with_env("NO_COLOR", "1");

        assert_eq!(config.tool, "mytool");
        assert_eq!(config.home_env, "MYTOOL_HOME");
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.capture_capacity, 512);
        assert!(
            config
                .fixed_env
                .contains(&("NO_COLOR".to_string(), "1".to_string()))
        );
    }
}
