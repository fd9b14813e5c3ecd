use std::time::Duration;

use anyhow::Context;

/// Connection pool and query budget settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    /// Pool size; must be at least 1.
    pub max_open_conns: u32,
    /// Informational only: sqlx has no idle-count cap, so idle connections
    /// are reaped by `max_idle_time` instead. See [`DbConfig::idle_cap`].
    pub max_idle_conns: u32,
    pub max_idle_time: Duration,
    /// Upper bound for every account store call, measured from call start.
    pub query_timeout: Duration,
}

impl DbConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_open_conns == 0 {
            anyhow::bail!("DB_MAX_OPEN_CONNS must be at least 1");
        }
        Ok(())
    }

    /// Idle connection count reported at startup, never above the pool size.
    pub fn idle_cap(&self) -> u32 {
        self.max_idle_conns.min(self.max_open_conns)
    }
}

/// Argon2 work factor.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                env_or("DB_USER", "mgv_user"),
                env_or("DB_PASSWORD", "mgv_password"),
                env_or("DB_HOST", "localhost"),
                env_or("DB_PORT", "5432"),
                env_or("DB_NAME", "mgv_hub_db"),
                env_or("DB_SSLMODE", "disable"),
            ),
        };

        let db = DbConfig {
            database_url,
            max_open_conns: env_parse_or("DB_MAX_OPEN_CONNS", 30),
            max_idle_conns: env_parse_or("DB_MAX_IDLE_CONNS", 30),
            max_idle_time: parse_duration(&env_or("DB_MAX_IDLE_TIME", "15m"))
                .context("DB_MAX_IDLE_TIME")?,
            query_timeout: parse_duration(&env_or("DB_QUERY_TIMEOUT", "5s"))
                .context("DB_QUERY_TIMEOUT")?,
        };
        db.validate()?;

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_parse_or("PASSWORD_MEMORY_KIB", defaults.memory_kib),
            iterations: env_parse_or("PASSWORD_ITERATIONS", defaults.iterations),
            parallelism: env_parse_or("PASSWORD_PARALLELISM", defaults.parallelism),
        };

        Ok(Self {
            host: env_or("APP_HOST", "0.0.0.0"),
            port: env_parse_first_or(&["APP_PORT", "PORT"], 9090),
            db,
            password,
        })
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.into())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

/// First of `keys` that is set and parses wins.
fn env_parse_first_or<T: std::str::FromStr>(keys: &[&str], fallback: T) -> T {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|v| v.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

/// Parses durations like `250ms`, `5s`, `15m`, `1h`.
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("missing unit in duration {raw:?}"))?;
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .with_context(|| format!("invalid duration {raw:?}"))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => anyhow::bail!("unknown duration unit {other:?} in {raw:?}"),
    };
    let secs = value
        .checked_mul(secs_per_unit)
        .ok_or_else(|| anyhow::anyhow!("duration {raw:?} is out of range"))?;
    Ok(Duration::from_secs(secs))
}
