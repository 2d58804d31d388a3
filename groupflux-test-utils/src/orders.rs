// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Keyed fixtures for partitioning tests.

use core::fmt;

/// A customer order: keyed by `customer`, carrying an `amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub customer: String,
    pub amount: u32,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.customer, self.amount)
    }
}

pub fn order(customer: &str, amount: u32) -> Order {
    Order {
        customer: customer.to_string(),
        amount,
    }
}

pub fn order_alice_10() -> Order {
    order("alice", 10)
}

pub fn order_bob_20() -> Order {
    order("bob", 20)
}

pub fn order_alice_30() -> Order {
    order("alice", 30)
}

pub fn order_carol_40() -> Order {
    order("carol", 40)
}

pub fn order_bob_50() -> Order {
    order("bob", 50)
}
