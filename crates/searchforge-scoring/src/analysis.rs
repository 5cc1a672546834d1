//! Constraint match records for score explanation.
//!
//! Matches are only produced when constraint match tracking is enabled on the
//! score director.

use std::collections::BTreeMap;
use std::fmt;

use searchforge_core::domain::EntityReference;
use searchforge_core::score::Score;
use searchforge_core::ConstraintRef;

/// One match of one constraint: the entities involved and the score impact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub score: Sc,
    /// Entities that caused the match.
    pub justification: Vec<EntityReference>,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    pub fn new(constraint_ref: ConstraintRef, score: Sc, justification: Vec<EntityReference>) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
        }
    }
}

/// All matches of one constraint and their summed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Score impact of a single unit match.
    pub constraint_weight: Sc,
    /// Sum of all match scores.
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn new(constraint_ref: ConstraintRef, constraint_weight: Sc, matches: Vec<ConstraintMatch<Sc>>) -> Self {
        let score = matches.iter().fold(Sc::zero(), |acc, m| acc + m.score);
        Self {
            constraint_ref,
            constraint_weight,
            score,
            matches,
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Per-constraint breakdown of a score.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub constraint_match_totals: Vec<ConstraintMatchTotal<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, constraint_match_totals: Vec<ConstraintMatchTotal<Sc>>) -> Self {
        Self {
            score,
            constraint_match_totals,
        }
    }

    /// Sums the match scores each entity is justified in.
    pub fn indictments(&self) -> BTreeMap<EntityReference, Sc> {
        let mut indictments = BTreeMap::new();
        for total in &self.constraint_match_totals {
            for m in &total.matches {
                for entity in &m.justification {
                    let entry = indictments.entry(*entity).or_insert_with(Sc::zero);
                    *entry = *entry + m.score;
                }
            }
        }
        indictments
    }
}

impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Explanation of score ({}):", self.score)?;
        for total in &self.constraint_match_totals {
            writeln!(
                f,
                "    {}: {} ({} matches)",
                total.constraint_ref,
                total.score,
                total.match_count()
            )?;
            for m in &total.matches {
                let entities: Vec<String> = m.justification.iter().map(|e| e.to_string()).collect();
                writeln!(f, "        {}: {}", m.score, entities.join(", "))?;
            }
        }
        Ok(())
    }
}
