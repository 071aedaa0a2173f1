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

use sassign_azure_blob::{Config, ServiceSasGenerator};
use sassign_core::time::now;
use sassign_core::{Context, OsEnv, Result};

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    // Reads AZBLOB_ACCOUNT_NAME, AZBLOB_ACCOUNT_KEY and AZBLOB_ENDPOINT.
    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);

    let container = std::env::args().nth(1).unwrap_or_else(|| "mycontainer".to_string());
    let path = std::env::args().nth(2).unwrap_or_else(|| "dir/file.txt".to_string());

    let generator = ServiceSasGenerator::from_config(&config)?;
    let token = generator.generate_sas_for_path(
        &container,
        &path,
        now() + chrono::TimeDelta::hours(1),
        "r",
    )?;

    println!("{}/{container}/{path}?{token}", config.endpoint()?);
    Ok(())
}
