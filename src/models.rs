pub mod access;
pub mod auth;
pub mod receiving;
pub mod sales;

use rust_decimal::Decimal;
use validator::ValidationError;

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("La valeur ne peut pas être négative.".into());
        return Err(err);
    }
    Ok(())
}
