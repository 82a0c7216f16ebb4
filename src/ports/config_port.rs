//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// `default` when the key is absent, `Err` when its value is not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, String>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, String>;
}
