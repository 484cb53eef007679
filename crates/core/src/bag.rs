use crate::{
    draw_replayable_pull, sweep_draws, sweep_resistance, verify_case, ConfigDocument, ConfigError,
    ConfigOverrides, EvalError, Pool, PoolBuilder, PullConfig, PullRun, ReplayablePull, RngState,
    TestCase, TestReport,
};

/// A built pool with the run configuration it was built under.
#[derive(Debug, Clone, Default)]
pub struct TokenBag {
    pub pool: Pool,
    pub config: PullConfig,
    pub test_pulls: Vec<TestCase>,
}

impl TokenBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the pool for one bag of `doc`. `bag_name` replaces the bag named
    /// by the document's `Config`. On error the pool is left empty.
    pub fn import_document(
        &mut self,
        doc: &ConfigDocument,
        bag_name: Option<&str>,
        include_tests: bool,
    ) -> Result<(), ConfigError> {
        let result = self.try_import(doc, bag_name, include_tests);
        if let Err(err) = &result {
            log::error!("failed to import configuration: {err}");
            self.pool = Pool::default();
            self.test_pulls.clear();
        }
        result
    }

    fn try_import(
        &mut self,
        doc: &ConfigDocument,
        bag_name: Option<&str>,
        include_tests: bool,
    ) -> Result<(), ConfigError> {
        let bag_pool = doc.bag_pool.as_ref().ok_or(ConfigError::MissingBagPool)?;
        let token_pool = doc
            .token_pool
            .as_ref()
            .ok_or(ConfigError::MissingTokenPool)?;

        let mut config = self.config.clone();
        if let Some(overrides) = &doc.config {
            overrides.apply(&mut config);
        }
        if let Some(name) = bag_name {
            config.bag_name = name.to_string();
        }
        let entry = bag_pool
            .get(&config.bag_name)
            .ok_or_else(|| ConfigError::UnknownBag(config.bag_name.clone()))?;
        if let Some(overrides) = entry.overrides() {
            overrides.apply(&mut config);
        }

        let tests: &[TestCase] = if include_tests { &doc.test_pulls } else { &[] };
        let pool = PoolBuilder::new(token_pool).build(entry.specification(), tests)?;
        log::debug!(
            "built bag `{}`: {} bags, {} token kinds, max rank {}",
            config.bag_name,
            pool.bags.len(),
            pool.tokens.len(),
            pool.max_rank
        );
        self.pool = pool;
        self.config = config;
        self.test_pulls = tests.to_vec();
        Ok(())
    }

    pub fn configure_pull(&mut self, overrides: &ConfigOverrides) {
        overrides.apply(&mut self.config);
    }

    pub fn max_rank(&self) -> u32 {
        self.config.max_rank.unwrap_or(self.pool.max_rank)
    }

    pub fn rank_name(&self, rank: u32) -> Option<&str> {
        self.config.rank_name(rank)
    }

    /// Draws one pull. A failed draw is logged and the tokens drawn before
    /// the failure are returned.
    pub fn replayable_pull(&self, rng: &mut RngState) -> ReplayablePull {
        self.draw(&self.config, rng)
    }

    pub fn pull(&self, rng: &mut RngState) -> Result<PullRun, EvalError> {
        let pull = self.draw(&self.config, rng);
        let sweeps = sweep_draws(&self.pool, &self.config, self.max_rank(), &pull)?;
        Ok(PullRun { pull, sweeps })
    }

    /// Draws and evaluates under the resistance configuration. The bag's own
    /// configuration is untouched.
    pub fn resistance_pull(&self, rng: &mut RngState) -> Result<PullRun, EvalError> {
        let pull = self.draw(&self.config.resistance(), rng);
        let sweeps = sweep_resistance(&self.pool, &self.config, self.max_rank(), &pull)?;
        Ok(PullRun { pull, sweeps })
    }

    pub fn verify_tests(&self) -> TestReport {
        let results = self
            .test_pulls
            .iter()
            .flat_map(|case| verify_case(&self.pool, &self.config, case))
            .collect();
        let report = TestReport { results };
        log::debug!(
            "verified {} tests, {} passed",
            report.results.len(),
            report.passed_count()
        );
        report
    }

    fn draw(&self, config: &PullConfig, rng: &mut RngState) -> ReplayablePull {
        match draw_replayable_pull(&self.pool, config, rng) {
            Ok(pull) => pull,
            Err(failure) => {
                log::error!("pull failed: {failure}");
                failure.partial
            }
        }
    }
}
