use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub type MemberName = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<MemberName>,
    pub expenses: Vec<Expense>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub payer: MemberName,
    pub amount: f64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Builds an expense without any validation. Inputs coming from clients
    /// go through [`NewExpense::validate`] first.
    pub fn new(payer: impl Into<MemberName>, amount: f64, note: impl Into<String>) -> Self {
        Expense {
            payer: payer.into(),
            amount,
            note: note.into(),
            created_at: Utc::now(),
        }
    }

    pub fn display_line(&self, currency: &str) -> String {
        let mut line = format!("{} spent {:.2} {}", self.payer, self.amount, currency);
        if !self.note.trim().is_empty() {
            line.push_str(" on ");
            line.push_str(&self.note);
        }
        line
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("group name must not be blank")]
    BlankGroupName,
    #[error("a group needs at least one member")]
    NoMembers,
    #[error("member names must not be blank")]
    BlankMemberName,
    #[error("member '{0}' appears more than once")]
    DuplicateMember(MemberName),
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(f64),
    #[error("'{0}' is not a member of this group")]
    UnknownPayer(MemberName),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub members: Vec<MemberName>,
}

impl NewGroup {
    pub fn validate(self, id: String) -> Result<Group, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::BlankGroupName);
        }
        if self.members.is_empty() {
            return Err(ValidationError::NoMembers);
        }

        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(self.members.len());
        for member in self.members {
            let member = member.trim().to_string();
            if member.is_empty() {
                return Err(ValidationError::BlankMemberName);
            }
            if !seen.insert(member.clone()) {
                return Err(ValidationError::DuplicateMember(member));
            }
            members.push(member);
        }

        Ok(Group {
            id,
            name,
            members,
            expenses: vec![],
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewExpense {
    pub payer: MemberName,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

impl NewExpense {
    /// Rejects amounts the calculator must never see, and payers that are
    /// not part of the group.
    pub fn validate(self, members: &[MemberName]) -> Result<Expense, ValidationError> {
        if !self.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount(self.amount));
        }
        if self.amount < 0.0 {
            return Err(ValidationError::NegativeAmount(self.amount));
        }
        if !members.contains(&self.payer) {
            return Err(ValidationError::UnknownPayer(self.payer));
        }
        Ok(Expense::new(self.payer, self.amount, self.note.trim()))
    }
}
