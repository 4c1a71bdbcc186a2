// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Database configuration

use serde::Deserialize;
use serde::Serialize;

/// Configuration for the database connection
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// URL of the database (`postgresql://user@host:port/database`)
    pub url: String,
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            r#"url = "postgresql://postgres@127.0.0.1:5432/ipam""#,
        )
        .unwrap();
        assert_eq!(config.url, "postgresql://postgres@127.0.0.1:5432/ipam");
    }
}
