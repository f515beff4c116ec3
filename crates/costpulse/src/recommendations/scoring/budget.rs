use serde::{Deserialize, Serialize};

/// Monthly cost of a candidate and the score after the budget check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetOutcome {
    pub total_monthly_cost: f64,
    pub over_budget: bool,
    pub final_score: f64,
}

/// Applies the household budget to composite scores.
///
/// The cost total is rent plus per-person groceries. Transport is left out of
/// the threshold check. The penalty is flat: one rupee over the budget and ten
/// thousand over receive the same multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetAdjuster {
    budget: f64,
    number_of_people: u32,
    penalty_multiplier: f64,
}

impl BudgetAdjuster {
    pub fn new(budget: f64, number_of_people: u32, penalty_multiplier: f64) -> Self {
        Self {
            budget,
            number_of_people,
            penalty_multiplier,
        }
    }

    pub fn total_monthly_cost(&self, rent: f64, grocery_cost_monthly: f64) -> f64 {
        rent + grocery_cost_monthly * f64::from(self.number_of_people)
    }

    pub fn apply(&self, composite_score: f64, rent: f64, grocery_cost_monthly: f64) -> BudgetOutcome {
        let total_monthly_cost = self.total_monthly_cost(rent, grocery_cost_monthly);
        let over_budget = total_monthly_cost > self.budget;
        let final_score = if over_budget {
            composite_score * self.penalty_multiplier
        } else {
            composite_score
        };

        BudgetOutcome {
            total_monthly_cost,
            over_budget,
            final_score,
        }
    }
}
