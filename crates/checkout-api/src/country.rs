//! # Country Data
//!
//! Currency and buyer document used for each supported country.

/// Country used when the request does not name one
pub const DEFAULT_COUNTRY: &str = "CO";

/// Fixed charge in minor units
pub const AMOUNT_MINOR_UNITS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryData {
    pub currency: &'static str,
    pub document_type: &'static str,
    pub document_number: &'static str,
    pub amount: u64,
}

/// Look up the data for an ISO country code; unknown codes get USD
pub fn country_data(country: &str) -> CountryData {
    let (currency, document_type, document_number) = match country {
        // the demo account only enables cards in USD for Colombia
        "CO" => ("USD", "CC", "1032765432"),
        "BR" => ("BRL", "CPF", "351.040.753-97"),
        "AR" => ("ARS", "PASS", "123554332"),
        "CL" => ("CLP", "CI", "80209924"),
        _ => ("USD", "PASS", "T12345"),
    };

    CountryData {
        currency,
        document_type,
        document_number,
        amount: AMOUNT_MINOR_UNITS,
    }
}
