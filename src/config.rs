use std::env;

use log::info;

/// Server configuration gathered once at startup from the environment.
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub mail: MailConfig,
}

pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Self {
        // The jwt module reads these per use; require them here so a
        // misconfigured deployment fails at boot instead of mid-request.
        required("JWT_ACCESS_SECRET");
        required("JWT_REFRESH_SECRET");
        let config = Config {
            database_url: required("DATABASE_URL"),
            host: or_default("HOST", "127.0.0.1"),
            port: or_default("PORT", "8080")
                .parse()
                .unwrap_or_else(|e| panic!("Invalid PORT value: {:?}", e)),
            mail: MailConfig {
                smtp_server: or_default("SMTP_SERVER", "localhost"),
                smtp_port: or_default("SMTP_PORT", "587")
                    .parse()
                    .unwrap_or_else(|e| panic!("Invalid SMTP_PORT value: {:?}", e)),
                smtp_username: or_default("SMTP_USERNAME", ""),
                smtp_password: or_default("SMTP_PASSWORD", ""),
                from: or_default("MAIL_FROM", "Event Hub <noreply@example.com>"),
            },
        };
        info!("listening on {}:{}", config.host, config.port);
        config
    }
}

fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|e| {
        panic!("Failed to get env with name '{}': {:?}", key, e);
    })
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "Failed to get env")]
    fn required_panics_when_the_key_is_missing() {
        required("EVENT_SERVICE_KEY_THAT_IS_NEVER_SET");
    }

    #[test]
    fn from_env_checks_jwt_secrets_at_boot() {
        std::env::set_var("JWT_ACCESS_SECRET", "access-secret-for-tests");
        std::env::set_var("JWT_REFRESH_SECRET", "refresh-secret-for-tests");
        std::env::set_var("DATABASE_URL", "postgres://localhost/events");
        let config = Config::from_env();
        assert_eq!(config.database_url, "postgres://localhost/events");
        assert_eq!(config.port, 8080);
    }
}
