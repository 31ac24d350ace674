use goose::prelude::*;
use serde_json::json;
use std::env;

async fn ping(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/ping").await?;
    Ok(())
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/health").await?;
    Ok(())
}

async fn issue_token(user: &mut GooseUser) -> TransactionResult {
    let client_id = env::var("CLIENT_ID").unwrap_or_default();
    let client_secret = env::var("CLIENT_SECRET").unwrap_or_default();
    let body = json!({
        "grant_type": "client_credentials",
        "client_id": client_id,
        "client_secret": client_secret,
    });
    let _goose_metrics = user.post_json("/oauth/token", &body).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    let have_client = env::var("CLIENT_ID").is_ok() && env::var("CLIENT_SECRET").is_ok();
    if !have_client {
        println!("CLIENT_ID/CLIENT_SECRET not set, skipping the token scenario");
    }

    let mut attack = GooseAttack::initialize()?.register_scenario(
        scenario!("Liveness")
            .register_transaction(transaction!(ping))
            .register_transaction(transaction!(health_check)),
    );

    if have_client {
        attack = attack
            .register_scenario(scenario!("TokenExchange").register_transaction(transaction!(issue_token)));
    }

    attack.execute().await?;

    Ok(())
}
