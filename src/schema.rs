//! Column names and domain bounds of the customer-churn table.

pub const AGE: &str = "Age";
pub const TENURE: &str = "Tenure";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";
pub const CONTRACT: &str = "Contract";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const CHURN: &str = "Churn";
/// Optional opaque identifier; never used as a feature.
pub const CUSTOMER_ID: &str = "CustomerID";

/// Columns every input file must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    AGE,
    TENURE,
    MONTHLY_CHARGES,
    TOTAL_CHARGES,
    CONTRACT,
    PAYMENT_METHOD,
    CHURN,
];

/// Columns that must hold numeric values to pass validation.
pub const NUMERIC_TYPED_COLUMNS: [&str; 3] = [AGE, TENURE, CHURN];

/// Columns mapped to integer codes.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [CONTRACT, PAYMENT_METHOD];

/// Columns standardized to zero mean and unit variance.
pub const NUMERIC_COLUMNS: [&str; 4] = [AGE, TENURE, MONTHLY_CHARGES, TOTAL_CHARGES];

pub const TARGET_COLUMN: &str = CHURN;

pub const MIN_AGE: f64 = 18.0;
pub const MAX_AGE: f64 = 100.0;
