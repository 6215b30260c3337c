//! Single-line text encoding of stored records.
//!
//! Fields are joined with [`DELIMITER`] in a fixed order per record type.
//! Typed fields are parsed through serde on a [`csv::StringRecord`], so a
//! missing or non-numeric value is an error rather than a default.

use csv::StringRecord;
use serde::Deserialize;
use thiserror::Error;

use crate::Amount;
use crate::model::{Client, LoginRecord, Person, TransferRecord, User};
use crate::permission::Permissions;

/// Separator between the fields of one line.
pub const DELIMITER: &str = "#//#";

/// Errors that can occur when encoding or decoding a line.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{kind} record has {found} fields, expected {expected}")]
    MalformedRecord {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{kind} record has an invalid field: {source}")]
    InvalidField {
        kind: &'static str,
        source: csv::Error,
    },

    #[error("{kind} field {field} contains the delimiter or a line break")]
    ForbiddenText { kind: &'static str, field: usize },
}

/// A fixed-schema record that maps to one line of text.
pub trait Record: Sized {
    const KIND: &'static str;
    const FIELDS: usize;

    fn to_fields(&self) -> Vec<String>;

    /// Build the record from exactly [`Self::FIELDS`] fields.
    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError>;
}

/// True when `text` can be written as one field of a line.
pub fn is_storable(text: &str) -> bool {
    !text.contains(DELIMITER) && !text.contains(['\n', '\r'])
}

/// Encode one record as a line (without the line terminator).
pub fn encode<R: Record>(record: &R) -> Result<String, CodecError> {
    let fields = record.to_fields();
    if let Some(field) = fields.iter().position(|f| !is_storable(f)) {
        return Err(CodecError::ForbiddenText {
            kind: R::KIND,
            field,
        });
    }
    Ok(fields.join(DELIMITER))
}

/// Decode one line into a record.
pub fn decode<R: Record>(line: &str) -> Result<R, CodecError> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() != R::FIELDS {
        return Err(CodecError::MalformedRecord {
            kind: R::KIND,
            expected: R::FIELDS,
            found: parts.len(),
        });
    }
    R::from_fields(&StringRecord::from(parts))
}

fn parse_row<'de, R, T>(fields: &'de StringRecord) -> Result<T, CodecError>
where
    R: Record,
    T: Deserialize<'de>,
{
    fields
        .deserialize(None)
        .map_err(|source| CodecError::InvalidField {
            kind: R::KIND,
            source,
        })
}

#[derive(Debug, Deserialize)]
struct ClientRow {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    pin_code: String,
    account_number: String,
    balance: Amount,
}

impl Record for Client {
    const KIND: &'static str = "client";
    const FIELDS: usize = 7;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.person.first_name.clone(),
            self.person.last_name.clone(),
            self.person.email.clone(),
            self.person.phone.clone(),
            self.pin_code.clone(),
            self.account_number().to_string(),
            self.balance().to_string(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        let row: ClientRow = parse_row::<Self, _>(fields)?;
        let person = Person {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        };
        Ok(Client::stored(person, row.account_number, row.pin_code, row.balance))
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    username: String,
    password: String,
    permissions: Permissions,
}

impl Record for User {
    const KIND: &'static str = "user";
    const FIELDS: usize = 7;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.person.first_name.clone(),
            self.person.last_name.clone(),
            self.person.email.clone(),
            self.person.phone.clone(),
            self.username().to_string(),
            self.password.clone(),
            self.permissions.access_value().to_string(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        let row: UserRow = parse_row::<Self, _>(fields)?;
        let person = Person {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        };
        Ok(User::stored(person, row.username, row.password, row.permissions))
    }
}

#[derive(Debug, Deserialize)]
struct LoginRow {
    timestamp: String,
    username: String,
    password: String,
    permissions: Permissions,
}

impl Record for LoginRecord {
    const KIND: &'static str = "login";
    const FIELDS: usize = 4;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.username.clone(),
            self.password.clone(),
            self.permissions.access_value().to_string(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        let row: LoginRow = parse_row::<Self, _>(fields)?;
        Ok(LoginRecord {
            timestamp: row.timestamp,
            username: row.username,
            password: row.password,
            permissions: row.permissions,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TransferRow {
    timestamp: String,
    source_account: String,
    destination_account: String,
    amount: Amount,
    source_balance: Amount,
    destination_balance: Amount,
    operator: String,
}

impl Record for TransferRecord {
    const KIND: &'static str = "transfer";
    const FIELDS: usize = 7;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.source_account.clone(),
            self.destination_account.clone(),
            self.amount.to_string(),
            self.source_balance.to_string(),
            self.destination_balance.to_string(),
            self.operator.clone(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        let row: TransferRow = parse_row::<Self, _>(fields)?;
        Ok(TransferRecord {
            timestamp: row.timestamp,
            source_account: row.source_account,
            destination_account: row.destination_account,
            amount: row.amount,
            source_balance: row.source_balance,
            destination_balance: row.destination_balance,
            operator: row.operator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;

    fn person() -> Person {
        Person {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
        }
    }

    #[test]
    fn client_line_layout() {
        let client = Client::stored(person(), "A150", "1234", Amount::from_units(500));
        assert_eq!(
            encode(&client).unwrap(),
            "Ada#//#Lovelace#//#ada@example.com#//#555-0100#//#1234#//#A150#//#500.0000"
        );
    }

    #[test]
    fn client_round_trip() {
        let client = Client::stored(person(), "A150", "1234", "12.5".parse().unwrap());
        let decoded: Client = decode(&encode(&client).unwrap()).unwrap();
        assert_eq!(decoded, client);
    }

    #[test]
    fn user_round_trip_keeps_full_access() {
        let user = User::stored(person(), "ada", "secret", Permissions::Full);
        let line = encode(&user).unwrap();
        assert!(line.ends_with("#//#-1"));
        let decoded: User = decode(&line).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn login_round_trip() {
        let record = LoginRecord {
            timestamp: "1/2/2024 - 9:5:7".into(),
            username: "ada".into(),
            password: "secret".into(),
            permissions: Permissions::Bits(33),
        };
        let decoded: LoginRecord = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn transfer_round_trip() {
        let record = TransferRecord {
            timestamp: "1/2/2024 - 9:5:7".into(),
            source_account: "A1".into(),
            destination_account: "A2".into(),
            amount: Amount::from_units(25),
            source_balance: Amount::from_units(75),
            destination_balance: Amount::from_units(125),
            operator: "ada".into(),
        };
        let decoded: TransferRecord = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn decode_legacy_balance_with_six_decimals() {
        let client: Client = decode("A#//#B#//#a@b#//#1#//#0000#//#A1#//#500.000000").unwrap();
        assert_eq!(client.balance(), Amount::from_units(500));
        assert!(client.is_updatable());
    }

    #[test]
    fn decode_fails_on_missing_fields() {
        let err = decode::<Client>("A#//#B#//#a@b#//#1#//#0000#//#A1").unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedRecord {
                kind: "client",
                expected: 7,
                found: 6
            }
        ));
    }

    #[test]
    fn decode_fails_on_extra_fields() {
        let err = decode::<LoginRecord>("t#//#u#//#p#//#1#//#extra").unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { found: 5, .. }));
    }

    #[test]
    fn decode_does_not_default_numbers() {
        let err = decode::<Client>("A#//#B#//#a@b#//#1#//#0000#//#A1#//#").unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { kind: "client", .. }));

        let err = decode::<User>("A#//#B#//#a@b#//#1#//#u#//#p#//#lots").unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { kind: "user", .. }));
    }

    #[test]
    fn decode_rejects_invalid_access_value() {
        let err = decode::<User>("A#//#B#//#a@b#//#1#//#u#//#p#//#-7").unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { .. }));
    }

    #[test]
    fn encode_rejects_delimiter_in_text() {
        let mut client = Client::stored(person(), "A1", "0000", Amount::ZERO);
        client.person.last_name = "Love#//#lace".into();
        assert!(matches!(
            encode(&client),
            Err(CodecError::ForbiddenText { field: 1, .. })
        ));

        client.person.last_name = "Love\nlace".into();
        assert!(encode(&client).is_err());
    }

    #[test]
    fn empty_text_fields_survive() {
        let client = Client::stored(Person::default(), "A1", "", Amount::ZERO);
        let decoded: Client = decode(&encode(&client).unwrap()).unwrap();
        assert_eq!(decoded, client);
    }
}
