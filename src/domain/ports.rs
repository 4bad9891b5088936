use crate::domain::model::WeatherRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 歷史天氣資料來源
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load(&self) -> Result<Vec<WeatherRecord>>;

    fn describe(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn n_estimators(&self) -> usize;
    fn test_size(&self) -> f64;
    fn random_seed(&self) -> u64;
    fn max_depth(&self) -> Option<usize>;
    fn min_samples_split(&self) -> usize;
    fn min_samples_leaf(&self) -> usize;
    fn max_range_days(&self) -> i64;
}
