//! Benchmark Planner
//!
//! Selects which registered benchmarks run.
//!
//! A benchmark is identified by `suite.name + "." + benchmark.name`. It is
//! kept when at least one include pattern matches anywhere in that name and
//! no exclude pattern does. An empty include list selects everything.
//!
//! Ordering: suites in registration order, benchmarks in insertion order.

use cyclebench_core::Suite;
use regex::Regex;

/// One selected benchmark
#[derive(Clone, Copy)]
pub struct PlannedBenchmark<'s> {
    /// Owning suite
    pub suite: &'s dyn Suite,
    /// Position of the benchmark inside the suite
    pub index: usize,
}

impl<'s> PlannedBenchmark<'s> {
    /// Benchmark name without the suite prefix
    pub fn name(&self) -> &'s str {
        self.suite.benchmark_name(self.index).unwrap_or_default()
    }

    /// `suite.benchmark`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.suite.name(), self.name())
    }
}

impl std::fmt::Debug for PlannedBenchmark<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannedBenchmark")
            .field("name", &self.qualified_name())
            .field("index", &self.index)
            .finish()
    }
}

/// Execution plan for benchmarks
#[derive(Debug, Default)]
pub struct ExecutionPlan<'s> {
    /// Ordered list of benchmarks to run
    pub benchmarks: Vec<PlannedBenchmark<'s>>,
}

impl ExecutionPlan<'_> {
    /// Number of selected benchmarks
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

/// Compile include or exclude patterns
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

/// Build the execution plan from registered suites
pub fn build_plan<'s>(
    suites: impl IntoIterator<Item = &'s dyn Suite>,
    include: &[Regex],
    exclude: &[Regex],
) -> ExecutionPlan<'s> {
    let selected = |name: &str| {
        let included = include.is_empty() || include.iter().any(|re| re.is_match(name));
        included && !exclude.iter().any(|re| re.is_match(name))
    };

    let benchmarks = suites
        .into_iter()
        .flat_map(|suite| {
            (0..suite.benchmark_count()).map(move |index| PlannedBenchmark { suite, index })
        })
        .filter(|planned| selected(&planned.qualified_name()))
        .collect();

    ExecutionPlan { benchmarks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclebench_core::{BenchmarkDescriptor, SuiteDescriptor};

    fn make_suite(name: &str, benchmarks: &[&str]) -> SuiteDescriptor<()> {
        benchmarks
            .iter()
            .fold(SuiteDescriptor::new(name, || ()), |suite, b| {
                suite.with_benchmark(BenchmarkDescriptor::new(*b, |_: &mut ()| {}))
            })
    }

    fn suites() -> Vec<SuiteDescriptor<()>> {
        vec![
            make_suite("org.sort.Sorting", &["quick", "merge", "bubble"]),
            make_suite("org.hash.Hashing", &["sip", "fx"]),
        ]
    }

    fn names(plan: &ExecutionPlan<'_>) -> Vec<String> {
        plan.benchmarks.iter().map(|b| b.qualified_name()).collect()
    }

    fn patterns(list: &[&str]) -> Vec<Regex> {
        compile_patterns(&list.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn select<'s>(suites: &'s [SuiteDescriptor<()>], include: &[&str], exclude: &[&str]) -> ExecutionPlan<'s> {
        build_plan(
            suites.iter().map(|s| s as &dyn Suite),
            &patterns(include),
            &patterns(exclude),
        )
    }

    #[test]
    fn test_no_filter_keeps_registration_order() {
        let suites = suites();
        let plan = select(&suites, &[], &[]);

        assert_eq!(
            names(&plan),
            vec![
                "org.sort.Sorting.quick",
                "org.sort.Sorting.merge",
                "org.sort.Sorting.bubble",
                "org.hash.Hashing.sip",
                "org.hash.Hashing.fx",
            ]
        );
    }

    #[test]
    fn test_include_matches_anywhere() {
        let suites = suites();
        let plan = select(&suites, &["Sorting.m"], &[]);
        assert_eq!(names(&plan), vec!["org.sort.Sorting.merge"]);
    }

    #[test]
    fn test_any_include_is_enough() {
        let suites = suites();
        let plan = select(&suites, &["quick$", "Hashing"], &[]);
        assert_eq!(
            names(&plan),
            vec!["org.sort.Sorting.quick", "org.hash.Hashing.sip", "org.hash.Hashing.fx"]
        );
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let suites = suites();
        let plan = select(&suites, &["Sorting"], &["bubble"]);
        assert_eq!(names(&plan), vec!["org.sort.Sorting.quick", "org.sort.Sorting.merge"]);
    }

    #[test]
    fn test_nothing_selected() {
        let suites = suites();
        let plan = select(&suites, &["Compression"], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_planned_name_is_unprefixed() {
        let suites = suites();
        let plan = select(&suites, &["Hashing"], &[]);
        let short: Vec<&str> = plan.benchmarks.iter().map(|b| b.name()).collect();
        assert_eq!(short, vec!["sip", "fx"]);
        assert_eq!(plan.benchmarks[1].index, 1);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(compile_patterns(&["(unclosed".to_string()]).is_err());
    }
}
