//! Suite and Benchmark Descriptors
//!
//! A [`SuiteDescriptor`] describes one benchmark class: how to build and
//! prepare an instance, which parameters it declares, and the benchmarks it
//! owns. A [`BenchmarkDescriptor`] is one measurable operation on that
//! instance. Descriptors trust their inputs and perform no validation.

use crate::blackhole::Blackhole;
use crate::config::SuiteDefaults;
use crate::params::{ParamSet, ParameterValues};
use std::future::Future;
use std::hint::black_box;
use std::pin::Pin;

/// Future returned by an asynchronous benchmark, borrowing the instance
pub type BenchFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a>>;

/// Synchronous benchmark body
pub type PlainFn<T> = dyn Fn(&mut T);
/// Synchronous benchmark body threading the shared sink
pub type BlackholeFn<T> = dyn Fn(&mut T, &mut Blackhole);
/// Asynchronous benchmark body
pub type AsyncFn<T> = dyn for<'a> Fn(&'a mut T) -> BenchFuture<'a>;
/// Asynchronous benchmark body threading the shared sink
pub type AsyncBlackholeFn<T> = dyn for<'a> Fn(&'a mut T, &'a mut Blackhole) -> BenchFuture<'a>;

/// Shape of a benchmark function
pub enum BenchmarkFunction<T> {
    /// Called without a sink; its result goes through `black_box`
    Plain(Box<PlainFn<T>>),
    /// Called with the shared sink, which also consumes its result
    WithBlackhole(Box<BlackholeFn<T>>),
    /// Returns a future; the timer stops after it resolves
    Async(Box<AsyncFn<T>>),
    /// Returns a future and takes the shared sink
    AsyncWithBlackhole(Box<AsyncBlackholeFn<T>>),
}

impl<T> BenchmarkFunction<T> {
    /// Whether the function takes the shared sink
    pub fn takes_blackhole(&self) -> bool {
        matches!(
            self,
            BenchmarkFunction::WithBlackhole(_) | BenchmarkFunction::AsyncWithBlackhole(_)
        )
    }

    /// Whether the function completes through a future
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            BenchmarkFunction::Async(_) | BenchmarkFunction::AsyncWithBlackhole(_)
        )
    }
}

/// One measurable operation of a suite
pub struct BenchmarkDescriptor<T> {
    name: String,
    function: BenchmarkFunction<T>,
}

impl<T> BenchmarkDescriptor<T> {
    /// Benchmark whose function takes only the instance
    pub fn new<R, F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
    {
        Self {
            name: name.into(),
            function: BenchmarkFunction::Plain(Box::new(move |instance: &mut T| {
                black_box(f(instance));
            })),
        }
    }

    /// Benchmark whose function also receives the shared sink
    pub fn with_blackhole<R, F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, &mut Blackhole) -> R + 'static,
    {
        Self {
            name: name.into(),
            function: BenchmarkFunction::WithBlackhole(Box::new(
                move |instance: &mut T, blackhole: &mut Blackhole| {
                    let result = f(instance, blackhole);
                    blackhole.consume(result);
                },
            )),
        }
    }

    /// Benchmark returning a future
    ///
    /// ```ignore
    /// BenchmarkDescriptor::asynchronous("roundTrip", |client| {
    ///     Box::pin(async move { client.round_trip().await; })
    /// })
    /// ```
    pub fn asynchronous<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> BenchFuture<'a> + 'static,
    {
        Self {
            name: name.into(),
            function: BenchmarkFunction::Async(Box::new(f)),
        }
    }

    /// Benchmark returning a future and receiving the shared sink
    pub fn asynchronous_with_blackhole<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut T, &'a mut Blackhole) -> BenchFuture<'a> + 'static,
    {
        Self {
            name: name.into(),
            function: BenchmarkFunction::AsyncWithBlackhole(Box::new(f)),
        }
    }

    /// Name within the owning suite
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function shape and body
    pub fn function(&self) -> &BenchmarkFunction<T> {
        &self.function
    }
}

/// A benchmark together with the suite that owns it
pub struct BenchmarkRef<'a, T> {
    /// Owning suite
    pub suite: &'a SuiteDescriptor<T>,
    /// The benchmark
    pub benchmark: &'a BenchmarkDescriptor<T>,
}

impl<T> Clone for BenchmarkRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BenchmarkRef<'_, T> {}

impl<T> BenchmarkRef<'_, T> {
    /// `suite.name + "." + benchmark.name`, the name filters match against
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.suite.name(), self.benchmark.name())
    }
}

/// One benchmark class and the benchmarks it owns
pub struct SuiteDescriptor<T> {
    name: String,
    factory: Box<dyn Fn() -> T>,
    parametrize: Box<dyn Fn(&mut T, &ParamSet)>,
    setup: Box<dyn Fn(&mut T)>,
    teardown: Box<dyn Fn(&mut T)>,
    parameters: Vec<String>,
    default_parameters: ParameterValues,
    defaults: SuiteDefaults,
    benchmarks: Vec<BenchmarkDescriptor<T>>,
}

impl<T> SuiteDescriptor<T> {
    /// Suite building instances with `factory`, no hooks and default settings
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
            parametrize: Box::new(|_: &mut T, _: &ParamSet| {}),
            setup: Box::new(|_: &mut T| {}),
            teardown: Box::new(|_: &mut T| {}),
            parameters: Vec::new(),
            default_parameters: ParameterValues::new(),
            defaults: SuiteDefaults::default(),
            benchmarks: Vec::new(),
        }
    }

    /// Apply resolved parameter values to a fresh instance
    pub fn with_parametrize<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T, &ParamSet) + 'static,
    {
        self.parametrize = Box::new(f);
        self
    }

    /// Hook run after parametrization, before any timing
    pub fn with_setup<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T) + 'static,
    {
        self.setup = Box::new(f);
        self
    }

    /// Hook run once measurement ends, including after a failure
    pub fn with_teardown<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T) + 'static,
    {
        self.teardown = Box::new(f);
        self
    }

    /// Declare a parameter and its default values
    pub fn with_parameter<I, S>(mut self, name: &str, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.parameters.iter().any(|p| p == name) {
            self.parameters.push(name.to_string());
        }
        self.default_parameters.set(name, defaults);
        self
    }

    /// Replace the suite-level defaults
    pub fn with_defaults(mut self, defaults: SuiteDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Builder form of [`SuiteDescriptor::add`]
    pub fn with_benchmark(mut self, benchmark: BenchmarkDescriptor<T>) -> Self {
        self.add(benchmark);
        self
    }

    /// Append a benchmark
    pub fn add(&mut self, benchmark: BenchmarkDescriptor<T>) {
        self.benchmarks.push(benchmark);
    }

    /// Suite name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, in order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Declared default values per parameter
    pub fn default_parameters(&self) -> &ParameterValues {
        &self.default_parameters
    }

    /// Suite-level defaults
    pub fn defaults(&self) -> &SuiteDefaults {
        &self.defaults
    }

    /// Benchmarks in insertion order, each paired with this suite
    pub fn benchmarks(&self) -> impl Iterator<Item = BenchmarkRef<'_, T>> {
        self.benchmarks
            .iter()
            .map(move |benchmark| BenchmarkRef {
                suite: self,
                benchmark,
            })
    }

    /// Benchmark at `index`
    pub fn benchmark(&self, index: usize) -> Option<BenchmarkRef<'_, T>> {
        self.benchmarks.get(index).map(|benchmark| BenchmarkRef {
            suite: self,
            benchmark,
        })
    }

    /// Number of benchmarks
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether the suite has no benchmarks
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Construct and parametrize an instance, then run the setup hook
    pub fn prepare_instance(&self, params: &ParamSet) -> T {
        let mut instance = (self.factory)();
        (self.parametrize)(&mut instance, params);
        (self.setup)(&mut instance);
        instance
    }

    /// Run the teardown hook
    pub fn teardown_instance(&self, instance: &mut T) {
        (self.teardown)(instance);
    }
}
