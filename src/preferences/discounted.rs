//! Time-discounted utility composition.
//!
//! Negotiation takes time, and time costs. The wrappers here compose a base
//! utility function with linear per-time costs and exponential discounting
//! along any of three time axes: protocol steps, relative session time, or
//! wall-clock seconds.

use serde::{Deserialize, Serialize};

use super::ufun::UtilityFunction;
use crate::outcomes::Outcome;

/// A snapshot of negotiation time at evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClock {
    /// Completed protocol rounds.
    pub step: u64,
    /// Fraction of the allowed session time already spent, in `[0, 1]`.
    pub relative_time: f64,
    /// Wall-clock seconds since the session started.
    pub elapsed_seconds: f64,
}

impl SessionClock {
    /// The clock at session start. Discounting at this clock is a no-op.
    pub fn start() -> Self {
        Self::default()
    }

    /// A clock at the given protocol step.
    pub fn at_step(step: u64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }
}

/// The time axis a discount layer reads from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFactor {
    Step,
    RelativeTime,
    RealTime,
}

impl TimeFactor {
    fn read(&self, clock: &SessionClock) -> f64 {
        match self {
            TimeFactor::Step => clock.step as f64,
            TimeFactor::RelativeTime => clock.relative_time,
            TimeFactor::RealTime => clock.elapsed_seconds,
        }
    }
}

/// Subtracts a linear time cost from the wrapped utility:
/// `u'(o, t) = u(o, t) - cost * t^power`.
pub struct LinDiscountedUfun {
    inner: Box<dyn UtilityFunction>,
    cost: f64,
    power: f64,
    factor: TimeFactor,
    dynamic_reservation: bool,
}

impl LinDiscountedUfun {
    /// Wraps `inner` with a linear cost along `factor`.
    pub fn new(
        inner: Box<dyn UtilityFunction>,
        cost: f64,
        power: Option<f64>,
        factor: TimeFactor,
        dynamic_reservation: bool,
    ) -> Self {
        Self {
            inner,
            cost,
            power: power.unwrap_or(1.0),
            factor,
            dynamic_reservation,
        }
    }

    fn penalty(&self, clock: &SessionClock) -> f64 {
        self.cost * self.factor.read(clock).powf(self.power)
    }
}

impl UtilityFunction for LinDiscountedUfun {
    fn evaluate(&self, outcome: &Outcome) -> f64 {
        self.evaluate_at(outcome, &SessionClock::start())
    }

    fn evaluate_at(&self, outcome: &Outcome, clock: &SessionClock) -> f64 {
        self.inner.evaluate_at(outcome, clock) - self.penalty(clock)
    }

    fn reserved_value(&self) -> Option<f64> {
        self.inner.reserved_value()
    }

    fn reserved_value_at(&self, clock: &SessionClock) -> Option<f64> {
        let r = self.inner.reserved_value_at(clock)?;
        if self.dynamic_reservation {
            Some(r - self.penalty(clock))
        } else {
            Some(r)
        }
    }

    fn shift_by(&mut self, offset: f64) {
        self.inner.shift_by(offset);
    }

    fn scale_by(&mut self, factor: f64) {
        // The cost scales with the utilities so the tradeoff is preserved.
        self.inner.scale_by(factor);
        self.cost *= factor;
    }
}

/// Multiplies the wrapped utility by an exponential discount:
/// `u'(o, t) = u(o, t) * discount^t`.
pub struct ExpDiscountedUfun {
    inner: Box<dyn UtilityFunction>,
    discount: f64,
    factor: TimeFactor,
    dynamic_reservation: bool,
}

impl ExpDiscountedUfun {
    /// Wraps `inner` with an exponential discount along `factor`.
    pub fn new(
        inner: Box<dyn UtilityFunction>,
        discount: f64,
        factor: TimeFactor,
        dynamic_reservation: bool,
    ) -> Self {
        Self {
            inner,
            discount,
            factor,
            dynamic_reservation,
        }
    }

    fn multiplier(&self, clock: &SessionClock) -> f64 {
        self.discount.powf(self.factor.read(clock))
    }
}

impl UtilityFunction for ExpDiscountedUfun {
    fn evaluate(&self, outcome: &Outcome) -> f64 {
        self.evaluate_at(outcome, &SessionClock::start())
    }

    fn evaluate_at(&self, outcome: &Outcome, clock: &SessionClock) -> f64 {
        self.inner.evaluate_at(outcome, clock) * self.multiplier(clock)
    }

    fn reserved_value(&self) -> Option<f64> {
        self.inner.reserved_value()
    }

    fn reserved_value_at(&self, clock: &SessionClock) -> Option<f64> {
        let r = self.inner.reserved_value_at(clock)?;
        if self.dynamic_reservation {
            Some(r * self.multiplier(clock))
        } else {
            Some(r)
        }
    }

    fn shift_by(&mut self, offset: f64) {
        self.inner.shift_by(offset);
    }

    fn scale_by(&mut self, factor: f64) {
        self.inner.scale_by(factor);
    }
}

/// Optional cost and discount layers for [`make_discounted_ufun`].
///
/// Every field is independent; a layer is engaged only when its parameter is
/// present and positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountParams {
    pub cost_per_step: Option<f64>,
    pub power_per_step: Option<f64>,
    pub cost_per_relative_time: Option<f64>,
    pub power_per_relative_time: Option<f64>,
    pub cost_per_real_time: Option<f64>,
    pub power_per_real_time: Option<f64>,
    pub discount_per_step: Option<f64>,
    pub discount_per_relative_time: Option<f64>,
    pub discount_per_real_time: Option<f64>,
    /// When set, each layer also discounts the reservation value.
    pub dynamic_reservation: bool,
}

impl Default for DiscountParams {
    fn default() -> Self {
        Self {
            cost_per_step: None,
            power_per_step: None,
            cost_per_relative_time: None,
            power_per_relative_time: None,
            cost_per_real_time: None,
            power_per_real_time: None,
            discount_per_step: None,
            discount_per_relative_time: None,
            discount_per_real_time: None,
            dynamic_reservation: true,
        }
    }
}

/// Wraps `ufun` in the cost and discount layers selected by `params`.
///
/// The wrapping order is fixed: every cost layer is applied before every
/// discount layer, so the discount multiplies the already cost-adjusted
/// value.
pub fn make_discounted_ufun(
    ufun: Box<dyn UtilityFunction>,
    params: &DiscountParams,
) -> Box<dyn UtilityFunction> {
    let mut ufun = ufun;
    let costs = [
        (params.cost_per_step, params.power_per_step, TimeFactor::Step),
        (
            params.cost_per_relative_time,
            params.power_per_relative_time,
            TimeFactor::RelativeTime,
        ),
        (
            params.cost_per_real_time,
            params.power_per_real_time,
            TimeFactor::RealTime,
        ),
    ];
    for (cost, power, factor) in costs {
        if let Some(cost) = cost {
            if cost > 0.0 {
                ufun = Box::new(LinDiscountedUfun::new(
                    ufun,
                    cost,
                    power,
                    factor,
                    params.dynamic_reservation,
                ));
            }
        }
    }
    let discounts = [
        (params.discount_per_step, TimeFactor::Step),
        (params.discount_per_relative_time, TimeFactor::RelativeTime),
        (params.discount_per_real_time, TimeFactor::RealTime),
    ];
    for (discount, factor) in discounts {
        if let Some(discount) = discount {
            if discount > 0.0 {
                ufun = Box::new(ExpDiscountedUfun::new(
                    ufun,
                    discount,
                    factor,
                    params.dynamic_reservation,
                ));
            }
        }
    }
    ufun
}
