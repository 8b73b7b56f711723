//! Integration tests replaying captured server responses.

mod contact_data;
mod delta;
mod discovery;
mod helpers;
mod replay;
