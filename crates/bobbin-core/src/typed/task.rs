//! TaskInput trait - binds a payload type to a task type.
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - `DeserializeOwned`: decoded from the task's `inputData`, owns its data

use serde::de::DeserializeOwned;

/// TaskInput ties a Rust type to the task type whose input it decodes.
///
/// # 使用例
/// ```ignore
/// #[derive(Deserialize)]
/// struct SendEmail {
///     to: String,
/// }
///
/// impl TaskInput for SendEmail {
///     const TYPE: &'static str = "email_send";
/// }
/// ```
pub trait TaskInput: DeserializeOwned + Send + 'static {
    /// Task type polled for this input.
    const TYPE: &'static str;
}

#[cfg(test)]
pub(crate) use self::fixtures::Greeting;

#[cfg(test)]
mod fixtures {
    use serde::Deserialize;

    use super::TaskInput;

    #[derive(Debug, Clone, Deserialize)]
    pub(crate) struct Greeting {
        pub name: String,
        #[serde(default)]
        pub fail: bool,
    }

    impl TaskInput for Greeting {
        const TYPE: &'static str = "test.greeting";
    }
}
