use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

use resilient_post::api::backoff::ExponentialBackoff;
use resilient_post::api::models::{ResponseEnvelope, user_registration};
use resilient_post::cache::ResponseCache;
use resilient_post::utils::{created_time, format_duration};
use resilient_post::{BackoffConfig, Config, Logger, MemorySink, PostClient, PostError, RetryLoop};

fn print_backoff_values(config: &BackoffConfig) {
    let backoff = ExponentialBackoff::new(config.clone());
    println!("InitialInterval: {}", format_duration(config.initial_interval));
    println!("RandomizationFactor: {}", config.randomization_factor);
    println!("Multiplier: {}", config.multiplier);
    println!("MaxInterval: {}", format_duration(config.max_interval));
    println!("MaxElapsedTime: {}", format_duration(config.max_elapsed_time));
    println!("CurrentInterval: {}", format_duration(backoff.current_interval()));
    println!("Elapsed: {}", format_duration(backoff.elapsed()));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Default to "warn" if neither RUST_LOG nor LOG_LEVEL is set
    if env::var("RUST_LOG").is_err() {
        // TODO: Audit that the environment access only happens in single-threaded code.
        unsafe {
            env::set_var(
                "RUST_LOG",
                env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            )
        };
    }
    env_logger::init();

    let config = Config::from_env().context("invalid configuration")?;
    print_backoff_values(&config.backoff);

    let sink = MemorySink::new();
    let logger = Logger::new(Arc::new(sink.clone()));

    let descriptor = user_registration(&config.url, &created_time());
    let client = PostClient::new(config.request_timeout, logger.clone())
        .context("failed to build HTTP client")?;
    let retry = RetryLoop::new(config.backoff.clone(), config.deadline, logger)?;
    let cache: ResponseCache<ResponseEnvelope> =
        ResponseCache::new(config.cache_ttl, config.cache_cleanup_interval);

    if let Some(cached) = cache.get(descriptor.url()).await {
        println!("Using cached response");
        println!("Response: {:?}", cached);
        return Ok(());
    }

    let outcome = client.execute(&descriptor, &retry).await;

    println!("Log Output:");
    println!("{}", sink.contents());

    match outcome {
        Ok(response) => {
            println!("Response: {}", response);

            if response.is_success() {
                cache
                    .set(
                        descriptor.url().to_string(),
                        response.envelope.clone(),
                        cache.default_ttl(),
                    )
                    .await;
                println!("Response Status Code: {}", response.status);
                println!("Response Body: {}", response.body);
            } else {
                println!("Error Response Status Code: {}", response.status);
                println!("Error Response Body: {}", response.body);
                println!(
                    "Error Content-Type Header: {}",
                    response.content_type.as_deref().unwrap_or_default()
                );
            }
        }
        Err(PostError::Client { status, body }) => {
            println!("Error: client error: {}", status);
            println!("Error Response Status Code: {}", status);
            println!("Error Response Body: {}", body);
        }
        Err(e) => {
            println!("Error: {}", e);
        }
    }

    Ok(())
}
