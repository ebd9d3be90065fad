use indicatif::ProgressStyle;

/// Extension trait for creating named progress bars.
pub trait NamedProgress {
    /// Creates a byte-counting progress bar style with a name label.
    ///
    /// # Arguments
    ///
    /// * `name` - Label to display with the progress bar
    fn named_bytes(name: &str) -> Self;
}

fn padded(name: &str) -> String {
    format!("{:<31}", name)
}

impl NamedProgress for ProgressStyle {
    fn named_bytes(name: &str) -> Self {
        let fmt = padded(name)
            + "{wide_bar:40.cyan/blue} {bytes:>10}/{total_bytes:<10} [{elapsed_precise}] {msg}";
        ProgressStyle::default_bar()
            .template(&fmt)
            .unwrap_or(ProgressStyle::default_bar())
    }
}
