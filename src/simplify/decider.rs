//! Move-selection policies.
//!
//! A decider inspects the current [`SimplificationData`] and returns the
//! decisions to apply in the next step. An empty list means the policy has
//! reached its fixed point. Every policy breaks ties on area by the lowest
//! ring index.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{OperationError, Result};

use super::config::SimplifyConfig;
use super::data::SimplificationData;
use super::moves::{Decision, Move, MoveKind, NormalSign, RotationPivot};

/// A move-selection policy.
pub trait Decider: fmt::Debug {
    /// Registry name of the policy.
    fn name(&self) -> &'static str;

    /// Decisions for the next step; empty at a fixed point.
    fn decide(&self, data: &SimplificationData) -> Vec<Decision>;
}

/// The built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeciderKind {
    OnlyPositive,
    OnlyNegative,
    SmallestSingle,
    MinimalPair,
    MinimalComplementaryPair,
    Minimal,
    OnlyRotation(RotationPivot),
}

impl DeciderKind {
    /// Registry name of the policy.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OnlyPositive => "only-positive",
            Self::OnlyNegative => "only-negative",
            Self::SmallestSingle => "smallest-single",
            Self::MinimalPair => "minimal-pair",
            Self::MinimalComplementaryPair => "minimal-complementary-pair",
            Self::Minimal => "minimal",
            Self::OnlyRotation(RotationPivot::Start) => "only-start-rotation",
            Self::OnlyRotation(RotationPivot::End) => "only-end-rotation",
            Self::OnlyRotation(RotationPivot::Middle) => "only-middle-rotation",
            Self::OnlyRotation(RotationPivot::Compensating) => "only-compensating-rotation",
        }
    }

    /// Instantiates the policy with the run's settings.
    #[must_use]
    pub fn build(self, config: &SimplifyConfig) -> Box<dyn Decider> {
        match self {
            Self::OnlyPositive => Box::new(OnlySign(NormalSign::Positive)),
            Self::OnlyNegative => Box::new(OnlySign(NormalSign::Negative)),
            Self::SmallestSingle => Box::new(SmallestSingle),
            Self::MinimalPair => Box::new(MinimalPair),
            Self::MinimalComplementaryPair => Box::new(MinimalComplementaryPair),
            Self::Minimal => Box::new(Minimal),
            Self::OnlyRotation(pivot) => Box::new(OnlyRotation {
                pivot,
                compensate: config.compensate_rotations,
            }),
        }
    }
}

/// Name → policy lookup.
#[derive(Debug, Clone)]
pub struct DeciderRegistry {
    entries: BTreeMap<String, DeciderKind>,
}

impl Default for DeciderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in [
            DeciderKind::OnlyPositive,
            DeciderKind::OnlyNegative,
            DeciderKind::SmallestSingle,
            DeciderKind::MinimalPair,
            DeciderKind::MinimalComplementaryPair,
            DeciderKind::Minimal,
            DeciderKind::OnlyRotation(RotationPivot::Start),
            DeciderKind::OnlyRotation(RotationPivot::End),
            DeciderKind::OnlyRotation(RotationPivot::Middle),
        ] {
            registry.register(kind.name(), kind);
        }
        registry
    }
}

impl DeciderRegistry {
    /// A registry with no policies.
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Registers `kind` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, kind: DeciderKind) {
        self.entries.insert(name.to_owned(), kind);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Looks up a policy by name.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnknownDecider` if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<DeciderKind> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| OperationError::UnknownDecider(name.to_owned()).into())
    }

    /// Looks up and instantiates a policy.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnknownDecider` if `name` is not registered.
    pub fn create(&self, name: &str, config: &SimplifyConfig) -> Result<Box<dyn Decider>> {
        Ok(self.get(name)?.build(config))
    }
}

// ── policies ──

/// Smallest applicable normal move of one sign.
#[derive(Debug)]
struct OnlySign(NormalSign);

impl Decider for OnlySign {
    fn name(&self) -> &'static str {
        match self.0 {
            NormalSign::Positive => DeciderKind::OnlyPositive.name(),
            NormalSign::Negative => DeciderKind::OnlyNegative.name(),
        }
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        smallest(data.applicable_moves(MoveKind::normal(self.0)))
            .map(Decision::full)
            .into_iter()
            .collect()
    }
}

#[derive(Debug)]
struct SmallestSingle;

impl Decider for SmallestSingle {
    fn name(&self) -> &'static str {
        DeciderKind::SmallestSingle.name()
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        smallest(normal_moves(data)).map(Decision::full).into_iter().collect()
    }
}

/// Smallest positive and smallest compatible negative, both in full.
#[derive(Debug)]
struct MinimalPair;

impl Decider for MinimalPair {
    fn name(&self) -> &'static str {
        DeciderKind::MinimalPair.name()
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        let positive = smallest(data.applicable_moves(MoveKind::Positive));
        let negatives = data.applicable_moves(MoveKind::Negative);
        match positive {
            Some(p) => {
                let partner = smallest(
                    negatives
                        .into_iter()
                        .filter(|n| fits_together(data, &p, n))
                        .collect(),
                );
                std::iter::once(p)
                    .chain(partner)
                    .map(Decision::full)
                    .collect()
            }
            None => smallest(negatives).map(Decision::full).into_iter().collect(),
        }
    }
}

/// A balanced pair move if one exists, else a positive and a negative move
/// applied at the smaller of their areas.
#[derive(Debug)]
struct MinimalComplementaryPair;

impl Decider for MinimalComplementaryPair {
    fn name(&self) -> &'static str {
        DeciderKind::MinimalComplementaryPair.name()
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        if let Some(pair) = smallest(data.applicable_moves(MoveKind::Pair)) {
            return vec![Decision::full(pair)];
        }
        let Some(positive) = smallest(data.applicable_moves(MoveKind::Positive)) else {
            return Vec::new();
        };
        let negative = smallest(
            data.applicable_moves(MoveKind::Negative)
                .into_iter()
                .filter(|n| fits_together(data, &positive, n))
                .collect(),
        );
        negative.map_or_else(Vec::new, |n| balanced(data, positive, n))
    }
}

/// Area-neutral first: compensating rotation, then pair move, then the
/// smallest normal move that has an opposite-sign compensator.
#[derive(Debug)]
struct Minimal;

impl Decider for Minimal {
    fn name(&self) -> &'static str {
        DeciderKind::Minimal.name()
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        if let Some(rotation) = smallest(data.applicable_moves(MoveKind::CompensatingRotation)) {
            return vec![Decision::full(rotation)];
        }
        if let Some(pair) = smallest(data.applicable_moves(MoveKind::Pair)) {
            return vec![Decision::full(pair)];
        }
        let mut candidates = normal_moves(data);
        sort_by_area(&mut candidates);
        for mv in &candidates {
            let compensator = smallest(
                candidates
                    .iter()
                    .filter(|c| c.net_area() * mv.net_area() < 0.0 && fits_together(data, mv, c))
                    .cloned()
                    .collect(),
            );
            if let Some(c) = compensator {
                return balanced(data, mv.clone(), c);
            }
        }
        Vec::new()
    }
}

/// Smallest rotation with one pivot, optionally followed by a normal move
/// cancelling its net area change.
#[derive(Debug)]
struct OnlyRotation {
    pivot: RotationPivot,
    compensate: bool,
}

impl Decider for OnlyRotation {
    fn name(&self) -> &'static str {
        DeciderKind::OnlyRotation(self.pivot).name()
    }

    fn decide(&self, data: &SimplificationData) -> Vec<Decision> {
        let Some(rotation) = smallest(data.applicable_moves(MoveKind::rotation(self.pivot))) else {
            return Vec::new();
        };
        let net = rotation.net_area();
        let eps = data.tolerance();
        let compensator = if self.compensate && net.abs() > eps {
            let sign = if net > 0.0 {
                NormalSign::Negative
            } else {
                NormalSign::Positive
            };
            smallest(
                data.applicable_moves(MoveKind::normal(sign))
                    .into_iter()
                    .filter(|c| c.area() >= net.abs() && fits_together(data, &rotation, c))
                    .collect(),
            )
        } else {
            None
        };
        let mut decisions = vec![Decision::full(rotation)];
        decisions.extend(compensator.map(|c| Decision::partial(c, net.abs(), eps)));
        decisions
    }
}

// ── helpers ──

fn normal_moves(data: &SimplificationData) -> Vec<Move> {
    let mut moves = data.applicable_moves(MoveKind::Positive);
    moves.extend(data.applicable_moves(MoveKind::Negative));
    moves
}

fn by_area(a: &Move, b: &Move) -> std::cmp::Ordering {
    a.area().total_cmp(&b.area()).then(a.index().cmp(&b.index()))
}

fn sort_by_area(moves: &mut [Move]) {
    moves.sort_by(by_area);
}

fn smallest(moves: Vec<Move>) -> Option<Move> {
    moves.into_iter().min_by(by_area)
}

/// Compatible, and applying both in full still leaves a polygon.
fn fits_together(data: &SimplificationData, a: &Move, b: &Move) -> bool {
    let shrink = -(a.net_area().min(0.0) + b.net_area().min(0.0));
    a.is_compatible(b, data.tolerance())
        && data.len() >= 3 + a.merges() + b.merges()
        && shrink < data.polygon().area() - data.tolerance()
}

/// Both moves applied for the smaller of their two areas.
fn balanced(data: &SimplificationData, a: Move, b: Move) -> Vec<Decision> {
    let area = a.area().min(b.area());
    let eps = data.tolerance();
    vec![Decision::partial(a, area, eps), Decision::partial(b, area, eps)]
}
