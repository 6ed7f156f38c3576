//! Feature schema and the request-scoped input/vector types built against it.

use serde_json::{Map, Value};

/// Number of columns the predictor was trained on.
pub const FEATURE_COUNT: usize = 43;

/// Column order the predictor expects. Each name appears exactly once.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] = [
    "CreditScore",
    "FirstPaymentDate",
    "FirstTimeHomebuyer",
    "MaturityDate",
    "MSA",
    "MIP",
    "Units",
    "Occupancy",
    "OCLTV",
    "DTI",
    "OrigUPB",
    "LTV",
    "OrigInterestRate",
    "Channel",
    "PPM",
    "ProductType",
    "PropertyState",
    "PropertyType",
    "PostalCode",
    "LoanPurpose",
    "OrigLoanTerm",
    "NumBorrowers",
    "SellerName",
    "ServicerName",
    "EverDelinquent",
    "MonthsDelinquent",
    "MonthsInRepayment",
    "MonthlyIncome",
    "InterestBurden",
    "LTV_Diff",
    "MIP_Ratio",
    "MultipleBorrowers",
    "log_OrigUPB",
    "log_DTI",
    "log_MIP",
    "OrigUPB.1",
    "DTI.1",
    "OrigUPB DTI",
    "PCA_1",
    "PCA_2",
    "PCA_3",
    "PCA_4",
    "PCA_5",
];

/// Raw request body: feature name to JSON value, in no particular order.
pub type RawInput = Map<String, Value>;

/// Ordered, immutable list of feature names.
#[derive(Copy, Clone, Debug)]
pub struct FeatureSchema {
    names: &'static [&'static str],
}

impl FeatureSchema {
    /// The 43-column credit-risk schema.
    pub const fn credit_risk() -> Self {
        Self {
            names: &FEATURE_SCHEMA,
        }
    }

    #[cfg(test)]
    pub(crate) const fn from_names(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::credit_risk()
    }
}

/// Values aligned positionally with a `FeatureSchema`.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
