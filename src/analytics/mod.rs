pub mod anomalies;

pub use anomalies::{detect_anomalies, AnomalyRow};
