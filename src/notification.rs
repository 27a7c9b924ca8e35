use serde::Serialize;
use tracing::info;

use crate::balance::format_amount;
use crate::schemas::MemberName;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn group_created(name: &str) -> Self {
        Notification {
            title: "Group Created".to_string(),
            message: format!("New group '{}' created successfully", name),
        }
    }

    pub fn expense_added(payer: &MemberName, amount: f64, currency: &str) -> Self {
        Notification {
            title: "Expense Added".to_string(),
            message: format!("You added {} for {}", payer, format_amount(amount, currency)),
        }
    }

    pub fn payment_registered(amount: f64, currency: &str) -> Self {
        Notification {
            title: "Payment registered".to_string(),
            message: format!("You payed {}", format_amount(amount, currency)),
        }
    }

    pub fn emit(&self) {
        info!(title = %self.title, message = %self.message, "notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Notification::group_created("Trip").message,
            "New group 'Trip' created successfully"
        );
        assert_eq!(
            Notification::expense_added(&"Alice".to_string(), 12.5, "kr").message,
            "You added Alice for 12.50 kr"
        );
        let paid = Notification::payment_registered(30.0, "kr");
        assert_eq!(paid.title, "Payment registered");
        assert_eq!(paid.message, "You payed 30.00 kr");
    }
}
