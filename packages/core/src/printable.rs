//! Bounded rendering of a descriptor for log lines.

use serde_json::Value;

use crate::JobDescriptor;

/// Arrays in `args` longer than this are summarised by default.
pub const DEFAULT_ARRAY_DISPLAY_LIMIT: usize = 5;

impl JobDescriptor {
    /// Copy of this descriptor safe to put in a log line.
    ///
    /// Every `args` element that is an array with more than
    /// `array_display_limit` members is replaced by `<Array of N elements>`.
    /// The descriptor itself is left untouched.
    pub fn printable(&self, array_display_limit: usize) -> JobDescriptor {
        let mut copy = self.clone();
        copy.args = self
            .args
            .iter()
            .map(|arg| printable_arg(arg, array_display_limit))
            .collect();
        copy
    }

    /// [`printable`](Self::printable) serialized as a single JSON string.
    pub fn printable_json(&self, array_display_limit: usize) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.printable(array_display_limit))
    }
}

fn printable_arg(arg: &Value, array_display_limit: usize) -> Value {
    match arg {
        Value::Array(items) if items.len() > array_display_limit => {
            Value::String(format!("<Array of {} elements>", items.len()))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use serde_json::json;

    fn job_with_args(args: Vec<Value>) -> JobDescriptor {
        JobDescriptor::new("Reports::ExportJob", args).with_jid("abc123")
    }

    #[test]
    fn five_members_are_logged_verbatim() {
        let job = job_with_args(vec![json!([1, 2, 3, 4, 5])]);
        let printable = job.printable(DEFAULT_ARRAY_DISPLAY_LIMIT);
        assert_eq!(printable.args, vec![json!([1, 2, 3, 4, 5])]);
    }

    #[test]
    fn six_members_are_summarised() {
        let job = job_with_args(vec![json!([1, 2, 3, 4, 5, 6]), json!("keep")]);
        let printable = job.printable(DEFAULT_ARRAY_DISPLAY_LIMIT);
        assert_eq!(
            printable.args,
            vec![json!("<Array of 6 elements>"), json!("keep")]
        );
        // the original is untouched
        assert_eq!(job.args[0], json!([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn only_arrays_are_summarised() {
        let big_object = json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6});
        let long_string = json!("x".repeat(64));
        let job = job_with_args(vec![big_object.clone(), long_string.clone(), json!(7)]);
        let printable = job.printable(DEFAULT_ARRAY_DISPLAY_LIMIT);
        assert_eq!(printable.args, vec![big_object, long_string, json!(7)]);
    }

    #[test]
    fn summarising_is_idempotent() {
        let job = job_with_args(vec![json!((0..100).collect::<Vec<_>>()), json!([1])]);
        let once = job.printable(DEFAULT_ARRAY_DISPLAY_LIMIT);
        let twice = once.printable(DEFAULT_ARRAY_DISPLAY_LIMIT);
        assert_eq!(once, twice);
        assert_eq!(twice.args[0], json!("<Array of 100 elements>"));
    }

    #[test]
    fn custom_limit_is_respected() {
        let job = job_with_args(vec![json!([1, 2, 3])]);
        assert_eq!(job.printable(2).args, vec![json!("<Array of 3 elements>")]);
        assert_eq!(job.printable(3).args, vec![json!([1, 2, 3])]);
    }

    #[test]
    fn printable_json_is_one_line() -> Result<(), serde_json::Error> {
        let job = job_with_args(vec![json!([1, 2, 3, 4, 5, 6, 7])]).with_bid("b-1");
        let rendered = job.printable_json(DEFAULT_ARRAY_DISPLAY_LIMIT)?;
        assert!(!rendered.contains('\n'));

        let parsed: Value = serde_json::from_str(&rendered)?;
        assert_eq!(parsed["jid"], json!("abc123"));
        assert_eq!(parsed["bid"], json!("b-1"));
        assert_eq!(parsed["args"], json!(["<Array of 7 elements>"]));
        Ok(())
    }
}
