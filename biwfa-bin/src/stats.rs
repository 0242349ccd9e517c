use derive_more::AddAssign;
use pa_types::Seq;
use std::fmt::Display;

#[derive(Default, Clone, AddAssign, Debug)]
pub struct AlignStats {
    pub sample_size: usize,
    pub len_a: usize,
    pub len_b: usize,
    /// Sum of the alignment costs.
    pub cost: i64,
    /// Alignments stopped by a resource limit.
    pub aborted: usize,
    /// Alignments that failed `--check`.
    pub failed: usize,
    /// Seconds spent aligning.
    pub duration: f64,
}

impl AlignStats {
    pub fn new(a: Seq, b: Seq, duration: f64) -> Self {
        Self {
            sample_size: 1,
            len_a: a.len(),
            len_b: b.len(),
            duration,
            ..Default::default()
        }
    }

    fn format<T: Display>(width: usize, title: &str, val: T) -> (String, String) {
        (format!("{title:>width$}"), format!("{val:>width$}"))
    }

    fn format_avg(&self, width: usize, title: &str, val: f64) -> (String, String) {
        let avg = val / self.sample_size.max(1) as f64;
        Self::format(width, title, format!("{avg:.2}"))
    }

    pub fn values(&self) -> (Vec<String>, Vec<String>) {
        [
            Self::format(7, "nr", self.sample_size),
            self.format_avg(10, "|a|", self.len_a as f64),
            self.format_avg(10, "|b|", self.len_b as f64),
            self.format_avg(9, "cost", self.cost as f64),
            Self::format(7, "abort", self.aborted),
            Self::format(7, "failed", self.failed),
            self.format_avg(9, "t (ms)", 1000. * self.duration),
        ]
        .into_iter()
        .unzip()
    }

    /// A header and a value line.
    pub fn table(&self) -> String {
        let (header, values) = self.values();
        format!("{}\n{}", header.join(" "), values.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_and_average() {
        let mut total = AlignStats::default();
        let mut s = AlignStats::new(b"ACGT", b"ACT", 0.5);
        s.cost = 8;
        total += s;
        total += AlignStats::new(b"AC", b"AC", 0.5);
        assert_eq!(total.sample_size, 2);
        assert_eq!(total.len_a, 6);
        let (header, values) = total.values();
        assert_eq!(header.len(), values.len());
        assert_eq!(values[3].trim(), "4.00");
    }
}
