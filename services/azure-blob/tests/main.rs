// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::env;

use anyhow::Result;
use http::StatusCode;
use log::{debug, warn};
use sassign_azure_blob::{
    Config, DelegationSasGenerator, OperationSasOptions, ServiceSasGenerator, StaticTokenProvider,
    UserDelegationKeyIssuer, UserPrincipal,
};
use sassign_core::time::now;
use sassign_core::{Context, OsEnv};
use sassign_http_send_reqwest::ReqwestHttpSend;

struct TestEnv {
    ctx: Context,
    config: Config,
    container: String,
}

fn init_test_env() -> Option<TestEnv> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SASSIGN_AZURE_BLOB_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let container = env::var("SASSIGN_AZURE_BLOB_CONTAINER")
        .expect("env SASSIGN_AZURE_BLOB_CONTAINER must set");

    Some(TestEnv {
        ctx,
        config,
        container,
    })
}

async fn head(url: &str) -> Result<StatusCode> {
    let resp = reqwest::Client::new().head(url).send().await?;
    debug!("got response: {:?}", resp);
    Ok(resp.status())
}

async fn list(url: &str) -> Result<StatusCode> {
    let resp = reqwest::Client::new().get(url).send().await?;
    debug!("got response: {:?}", resp);
    Ok(resp.status())
}

#[tokio::test]
async fn test_service_sas_head_blob() -> Result<()> {
    let Some(env) = init_test_env() else {
        warn!("SASSIGN_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    let generator = ServiceSasGenerator::from_config(&env.config)?;
    let token = generator.generate_sas_for_path(
        &env.container,
        "not_exist_dir/not_exist_file",
        now() + chrono::TimeDelta::minutes(10),
        "r",
    )?;

    // A valid signature turns the request into a plain 404.
    let url = format!(
        "{}/{}/not_exist_dir/not_exist_file?{token}",
        env.config.endpoint()?,
        env.container
    );
    assert_eq!(head(&url).await?, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_service_sas_list_container() -> Result<()> {
    let Some(env) = init_test_env() else {
        warn!("SASSIGN_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    let generator = ServiceSasGenerator::from_config(&env.config)?;
    let token = generator.generate_sas_for_container(
        &env.container,
        now() + chrono::TimeDelta::minutes(10),
        "rl",
    )?;

    let url = format!(
        "{}/{}?restype=container&comp=list&{token}",
        env.config.endpoint()?,
        env.container
    );
    assert_eq!(list(&url).await?, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_service_sas_rejects_missing_permission() -> Result<()> {
    let Some(env) = init_test_env() else {
        warn!("SASSIGN_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    let generator = ServiceSasGenerator::from_config(&env.config)?;
    let token = generator.generate_sas_for_container(
        &env.container,
        now() + chrono::TimeDelta::minutes(10),
        "w",
    )?;

    let url = format!(
        "{}/{}?restype=container&comp=list&{token}",
        env.config.endpoint()?,
        env.container
    );
    assert_eq!(list(&url).await?, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_delegation_sas_for_operation() -> Result<()> {
    let Some(env) = init_test_env() else {
        warn!("SASSIGN_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };
    let Ok(bearer_token) = env::var("SASSIGN_AZURE_BLOB_BEARER_TOKEN") else {
        warn!("SASSIGN_AZURE_BLOB_BEARER_TOKEN is not set, skipped");
        return Ok(());
    };

    let issuer =
        UserDelegationKeyIssuer::from_config(&env.config, StaticTokenProvider::new(&bearer_token))?;
    let generator = DelegationSasGenerator::from_config(env.ctx.clone(), &env.config, issuer)?;
    generator.refresh_key().await?;

    let token = generator
        .generate_sas_for_operation_with(
            &env.container,
            "not_exist_dir/not_exist_file",
            "get-properties",
            OperationSasOptions {
                correlation_id: Some(uuid::Uuid::new_v4()),
                principal: None,
            },
        )
        .await?;

    let url = format!(
        "{}/{}/not_exist_dir/not_exist_file?{token}",
        env.config.endpoint()?,
        env.container
    );
    assert_eq!(head(&url).await?, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delegation_sas_with_authorized_user() -> Result<()> {
    let Some(env) = init_test_env() else {
        warn!("SASSIGN_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };
    let (Ok(bearer_token), Ok(object_id)) = (
        env::var("SASSIGN_AZURE_BLOB_BEARER_TOKEN"),
        env::var("SASSIGN_AZURE_BLOB_USER_OBJECT_ID"),
    ) else {
        warn!("SASSIGN_AZURE_BLOB_BEARER_TOKEN or SASSIGN_AZURE_BLOB_USER_OBJECT_ID is not set, skipped");
        return Ok(());
    };

    let issuer =
        UserDelegationKeyIssuer::from_config(&env.config, StaticTokenProvider::new(&bearer_token))?;
    let generator = DelegationSasGenerator::from_config(env.ctx.clone(), &env.config, issuer)?;

    let token = generator
        .generate_sas_for_operation_with(
            &env.container,
            "not_exist_dir/not_exist_file",
            "read",
            OperationSasOptions {
                correlation_id: None,
                principal: Some(UserPrincipal::Authorized(object_id.parse()?)),
            },
        )
        .await?;

    let url = format!(
        "{}/{}/not_exist_dir/not_exist_file?{token}",
        env.config.endpoint()?,
        env.container
    );
    assert_eq!(head(&url).await?, StatusCode::NOT_FOUND);
    Ok(())
}
