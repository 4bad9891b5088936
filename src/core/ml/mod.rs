//! Tabular learners used by the forecaster: CART trees, random forests,
//! label encoding, train/test splitting and evaluation metrics.

pub mod encoder;
pub mod forest;
pub mod metrics;
pub mod split;
pub mod tree;

pub use encoder::LabelEncoder;
pub use forest::{ForestParams, MaxFeatures, RandomForestClassifier, RandomForestRegressor};
pub use split::{train_test_split, Split};
