mod helpers;
mod mocks;

mod health;
mod payable;
mod payments;
mod penalties;
