// Tiered retrieval plans
//
// *Le Plan* - Turn a classified query into ordered predicate tiers

use crate::analyzer::{QueryAnalysis, QueryClass, QueryToken};
use crate::dimension::Dimension;
use lecatalogue::{PartField, Predicate};
use serde::{Deserialize, Serialize};

/// Matching strategy of one tier, in relevance order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierKind {
    /// Part number equals the query
    ExactId,
    /// Part number starts with the query
    IdPrefix,
    /// Name or alternate name matches the classified query
    NameMatch,
    /// Cached related ids contain the query
    CrossReference,
    /// Category membership only, no text
    Category,
}

impl TierKind {
    /// Rank used for tier-ordered sorting; lower wins
    pub fn rank(&self) -> u8 {
        match self {
            TierKind::ExactId | TierKind::Category => 1,
            TierKind::IdPrefix => 2,
            TierKind::NameMatch => 3,
            TierKind::CrossReference => 4,
        }
    }
}

/// One matching strategy with its bound predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Strategy
    pub kind: TierKind,
    /// Filter including any category restriction
    pub predicate: Predicate,
}

/// Ordered tiers plus the predicate for the total count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Tiers in evaluation order
    pub tiers: Vec<Tier>,
    /// Union of every tier, used only for the total
    pub count: Predicate,
    /// Strategy name for logs
    pub strategy: String,
}

/// Builds [`SearchPlan`]s from query classifications
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanBuilder;

impl PlanBuilder {
    /// Create a plan builder
    pub fn new() -> Self {
        Self
    }

    /// Four-tier text plan, optionally restricted to a category closure
    pub fn build(&self, analysis: &QueryAnalysis, closure: Option<&[String]>) -> SearchPlan {
        let q = analysis.query.as_str();
        let name_match = name_condition(&analysis.class);

        let exact = Predicate::Equals(PartField::PartNum, q.to_string());
        let prefix = Predicate::StartsWith(PartField::PartNum, q.to_string());
        let not_exact = Predicate::NotEquals(PartField::PartNum, q.to_string());
        let cross_reference = Predicate::Contains(PartField::AltPartIds, q.to_string());

        let tiers = vec![
            (TierKind::ExactId, exact),
            (
                TierKind::IdPrefix,
                Predicate::all([prefix.clone(), not_exact.clone()]),
            ),
            (
                TierKind::NameMatch,
                Predicate::all([name_match.clone(), Predicate::negate(prefix.clone())]),
            ),
            (
                TierKind::CrossReference,
                Predicate::all([cross_reference.clone(), not_exact]),
            ),
        ];

        let count = Predicate::any([prefix, name_match, cross_reference]);

        SearchPlan {
            tiers: tiers
                .into_iter()
                .map(|(kind, predicate)| Tier {
                    kind,
                    predicate: restrict(predicate, closure),
                })
                .collect(),
            count: restrict(count, closure),
            strategy: analysis.class.name().to_string(),
        }
    }

    /// Single untiered predicate for a category without text
    pub fn category_only(&self, closure: &[String]) -> SearchPlan {
        let membership = Predicate::In(PartField::BaCategory, closure.to_vec());
        SearchPlan {
            tiers: vec![Tier {
                kind: TierKind::Category,
                predicate: membership.clone(),
            }],
            count: membership,
            strategy: "category".to_string(),
        }
    }
}

fn restrict(predicate: Predicate, closure: Option<&[String]>) -> Predicate {
    match closure {
        Some(ids) => Predicate::all([
            predicate,
            Predicate::In(PartField::BaCategory, ids.to_vec()),
        ]),
        None => predicate,
    }
}

/// Part number, name or alternate name contains the term
fn term_match(term: &str) -> Predicate {
    Predicate::any([
        Predicate::Contains(PartField::PartNum, term.to_string()),
        Predicate::Contains(PartField::Name, term.to_string()),
        Predicate::Contains(PartField::BaName, term.to_string()),
    ])
}

/// Name or alternate name contains any spelling of any dimension
fn dimension_match<'a>(dimensions: impl IntoIterator<Item = &'a Dimension>) -> Predicate {
    Predicate::any(dimensions.into_iter().flat_map(|dimension| {
        dimension.variants().into_iter().flat_map(|variant| {
            [
                Predicate::Contains(PartField::Name, variant.clone()),
                Predicate::Contains(PartField::BaName, variant),
            ]
        })
    }))
}

fn dimension_with_terms(dimensions: &[Dimension], terms: &[String]) -> Predicate {
    Predicate::all(
        std::iter::once(dimension_match(dimensions)).chain(terms.iter().map(|t| term_match(t))),
    )
}

/// Tier 3 condition for each strategy
fn name_condition(class: &QueryClass) -> Predicate {
    match class {
        QueryClass::Plain { term } => term_match(term),
        QueryClass::ExactDimension { dimension } => dimension_match([dimension]),
        QueryClass::EmbeddedDimension { dimensions } => dimension_match(dimensions),
        QueryClass::Combined { dimensions, terms } => dimension_with_terms(dimensions, terms),
        QueryClass::MultiWord { tokens } => Predicate::all(tokens.iter().map(|token| match token {
            QueryToken::Dimension(dimension) => dimension_match([dimension]),
            QueryToken::Term(term) => term_match(term),
        })),
    }
}
