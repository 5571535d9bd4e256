// File: crates/bubble-core/src/simulate.rs
// Summary: Patrilineal surname population simulator that writes one generation CSV per step.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::FrameLoader;
use crate::record::{SurnameRecord, COL_COUNT, COL_NATIONALITY, COL_SURNAME};

/// Share of each generation's immigrants drawn from one nationality's pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImmigrationShare {
    pub nationality: String,
    pub share: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub generations: usize,
    pub initial_population: usize,
    /// Immigrants added per generation, as a fraction of the current population.
    pub immigration_fraction: f64,
    pub immigration: Vec<ImmigrationShare>,
    pub second_child_probability: f64,
    pub native_nationality: String,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let share = |n: &str, s: f64| ImmigrationShare { nationality: n.to_string(), share: s };
        Self {
            generations: 50,
            initial_population: 10_000,
            immigration_fraction: 0.4,
            immigration: vec![share("Indian", 0.4), share("Russian", 0.3), share("Polish", 0.2), share("Arabic", 0.1)],
            second_child_probability: 0.44,
            native_nationality: "English".to_string(),
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid simulation config {}", path.display()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub surname: String,
    pub sex: Sex,
    pub nationality: String,
}

/// Names with relative frequencies.
#[derive(Clone, Debug, Default)]
pub struct WeightedNames {
    pub names: Vec<String>,
    pub weights: Vec<u64>,
}

impl WeightedNames {
    pub fn push(&mut self, name: String, weight: u64) {
        self.names.push(name);
        self.weights.push(weight);
    }

    fn sampler(&self) -> Result<WeightedIndex<u64>> {
        WeightedIndex::new(&self.weights).map_err(|e| anyhow!("cannot sample names: {e}"))
    }
}

fn open_csv(path: &Path) -> Result<(csv::Reader<std::fs::File>, csv::StringRecord)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    Ok((rdr, headers))
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow!("{}: missing column `{name}`", path.display()))
}

/// Native surnames: columns `Name`, `Frequency`. Rows with zero frequency are dropped.
pub fn load_native_surnames(path: &Path) -> Result<WeightedNames> {
    let (mut rdr, headers) = open_csv(path)?;
    let (i_name, i_freq) = (column(&headers, "Name", path)?, column(&headers, "Frequency", path)?);
    let mut out = WeightedNames::default();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(i_name).unwrap_or("").to_string();
        let freq: u64 = rec
            .get(i_freq)
            .unwrap_or("")
            .parse()
            .with_context(|| format!("{}: bad frequency for `{name}`", path.display()))?;
        if freq > 0 && !name.is_empty() {
            out.push(name, freq);
        }
    }
    Ok(out)
}

/// Immigrant pool: columns `nationality`, `name`, `ZipfPopularity`, grouped by nationality.
pub fn load_immigrant_pool(path: &Path) -> Result<BTreeMap<String, WeightedNames>> {
    let (mut rdr, headers) = open_csv(path)?;
    let i_nat = column(&headers, "nationality", path)?;
    let i_name = column(&headers, "name", path)?;
    let i_pop = column(&headers, "ZipfPopularity", path)?;
    let mut pool: BTreeMap<String, WeightedNames> = BTreeMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(i_name).unwrap_or("").to_string();
        let popularity: u64 = rec
            .get(i_pop)
            .unwrap_or("")
            .parse()
            .with_context(|| format!("{}: bad popularity for `{name}`", path.display()))?;
        let nationality = rec.get(i_nat).unwrap_or("").to_string();
        pool.entry(nationality).or_default().push(name, popularity);
    }
    Ok(pool)
}

/// Per-surname head counts, most common first (ties by surname). Nationality is the first one seen.
pub fn surname_counts(population: &[Person]) -> Vec<SurnameRecord> {
    let mut counts: HashMap<&str, (u64, &str)> = HashMap::new();
    for p in population {
        counts.entry(p.surname.as_str()).or_insert((0, p.nationality.as_str())).0 += 1;
    }
    let mut out: Vec<SurnameRecord> = counts
        .into_iter()
        .map(|(s, (c, n))| SurnameRecord::new(s, c, Some(n)))
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.surname.cmp(&b.surname)));
    out
}

pub fn write_generation(path: &Path, records: &[SurnameRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    w.write_record([COL_SURNAME, COL_COUNT, COL_NATIONALITY])?;
    for r in records {
        w.write_record([r.surname.as_str(), r.count.to_string().as_str(), r.nationality.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub population: usize,
    pub unique_surnames: usize,
}

pub struct Simulator {
    cfg: SimulationConfig,
    rng: StdRng,
}

impl Simulator {
    pub fn new(cfg: SimulationConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self { cfg, rng }
    }

    fn random_sex(&mut self) -> Sex {
        if self.rng.gen_bool(0.5) { Sex::Male } else { Sex::Female }
    }

    pub fn initial_population(&mut self, natives: &WeightedNames) -> Result<Vec<Person>> {
        let dist = natives.sampler()?;
        let nationality = self.cfg.native_nationality.clone();
        Ok((0..self.cfg.initial_population)
            .map(|_| {
                let surname = natives.names[dist.sample(&mut self.rng)].clone();
                Person { surname, sex: self.random_sex(), nationality: nationality.clone() }
            })
            .collect())
    }

    /// `total` immigrants split by the configured shares; nationalities missing from the pool are skipped.
    pub fn immigrants(&mut self, pool: &BTreeMap<String, WeightedNames>, total: usize) -> Result<Vec<Person>> {
        let mut out = Vec::new();
        for share in self.cfg.immigration.clone() {
            let n = (total as f64 * share.share) as usize;
            let Some(names) = pool.get(&share.nationality) else { continue };
            if n == 0 {
                continue;
            }
            let dist = names.sampler()?;
            for _ in 0..n {
                let surname = names.names[dist.sample(&mut self.rng)].clone();
                out.push(Person { surname, sex: self.random_sex(), nationality: share.nationality.clone() });
            }
        }
        Ok(out)
    }

    /// Pair shuffled men and women; each couple has one child, sometimes two, carrying the father's surname.
    pub fn reproduce(&mut self, population: Vec<Person>) -> Vec<Person> {
        let (mut males, mut females): (Vec<Person>, Vec<Person>) =
            population.into_iter().partition(|p| p.sex == Sex::Male);
        males.shuffle(&mut self.rng);
        females.shuffle(&mut self.rng);

        let pairs = males.len().min(females.len());
        let mut next = Vec::with_capacity(pairs * 2);
        for father in males.into_iter().take(pairs) {
            next.push(Person { surname: father.surname.clone(), sex: self.random_sex(), nationality: father.nationality.clone() });
            if self.rng.gen_bool(self.cfg.second_child_probability.clamp(0.0, 1.0)) {
                next.push(Person { surname: father.surname, sex: self.random_sex(), nationality: father.nationality });
            }
        }
        next
    }

    /// Run every generation, writing each one where `out` will later look for it.
    pub fn run(
        &mut self,
        natives: &WeightedNames,
        pool: &BTreeMap<String, WeightedNames>,
        out: &FrameLoader,
    ) -> Result<Vec<GenerationSummary>> {
        let mut population = self.initial_population(natives)?;
        let mut summaries = Vec::with_capacity(self.cfg.generations);

        for generation in 0..self.cfg.generations {
            let arrivals = (population.len() as f64 * self.cfg.immigration_fraction) as usize;
            population.extend(self.immigrants(pool, arrivals)?);

            let counts = surname_counts(&population);
            let summary = GenerationSummary { generation, population: population.len(), unique_surnames: counts.len() };
            info!(generation, people = summary.population, surnames = summary.unique_surnames, "simulated generation");
            write_generation(&out.resource_path(generation), &counts)?;
            summaries.push(summary);

            population = self.reproduce(population);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(s: &str, sex: Sex, n: &str) -> Person {
        Person { surname: s.to_string(), sex, nationality: n.to_string() }
    }

    #[test]
    fn counts_sorted_with_first_seen_nationality() {
        let pop = vec![
            person("Khan", Sex::Male, "Arabic"),
            person("Smith", Sex::Female, "English"),
            person("Khan", Sex::Female, "Indian"),
            person("Smith", Sex::Male, "English"),
            person("Khan", Sex::Male, "Arabic"),
            person("Abbott", Sex::Male, "English"),
        ];
        let counts = surname_counts(&pop);
        assert_eq!(counts[0], SurnameRecord::new("Khan", 3, Some("Arabic")));
        assert_eq!(counts[1].surname, "Smith");
        assert_eq!(counts[2].surname, "Abbott");
    }

    #[test]
    fn children_inherit_the_fathers_surname() {
        let mut sim = Simulator::new(SimulationConfig { second_child_probability: 1.0, ..SimulationConfig::default() });
        let pop = vec![
            person("Nowak", Sex::Male, "Polish"),
            person("Smith", Sex::Female, "English"),
            person("Jones", Sex::Female, "English"),
        ];
        let kids = sim.reproduce(pop);
        assert_eq!(kids.len(), 2);
        assert!(kids.iter().all(|k| k.surname == "Nowak" && k.nationality == "Polish"));
    }

    #[test]
    fn immigrant_split_follows_shares() {
        let mut pool = BTreeMap::new();
        let mut indian = WeightedNames::default();
        indian.push("Patel".into(), 5);
        pool.insert("Indian".to_string(), indian);
        let mut sim = Simulator::new(SimulationConfig::default());
        let arrivals = sim.immigrants(&pool, 100).unwrap();
        // only the Indian pool exists: 40% of 100
        assert_eq!(arrivals.len(), 40);
        assert!(arrivals.iter().all(|p| p.surname == "Patel" && p.nationality == "Indian"));
    }
}
