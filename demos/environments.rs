use envtree::environment::CurrentMode;
use envtree::{configure, ConfigError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The "mode" adapter follows the process-wide mode, seeded from APP_ENV
    let config = configure(|c| {
        c.use_environment("mode")?;
        c.set("name", "billing")?;
        c.set_with("debug", |env| {
            env.environment(["development", "test"], true)?;
            Ok(false.into())
        })?;
        c.namespace("database", |db| {
            db.set_with("host", |env| {
                env.environment("production", "db.internal")?;
                env.environment(["qa", "staging"], "db.staging.internal")?;
                Ok("localhost".into())
            })?;
            db.set("port", 5432)?;
            Ok(())
        })?;
        Ok(())
    })?;

    for mode in ["development", "staging", "production"] {
        CurrentMode::global().set(mode);
        println!(
            "{mode}: debug={} {}",
            config.get_bool("debug")?,
            serde_json::Value::Object(config.to_map()?)
        );
    }

    println!("{}", toml::to_string(&config.to_toml()?)?);

    Ok(())
}
