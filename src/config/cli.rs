use crate::config::toml_config::TomlConfig;
use crate::config::CliConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

impl CliConfig {
    /// 載入 TOML (若有指定) 後套用命令列覆蓋，再驗證
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(data) = &self.data {
            config.data.csv_path = data.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = Some(dir.clone());
        }
        if let Some(trees) = self.trees {
            config.training.n_estimators = trees;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }
}
