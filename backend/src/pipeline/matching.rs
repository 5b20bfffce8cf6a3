//! Routing of uploaded rows to registered recipients by phone number.

use common::model::recipient::Recipient;
use common::model::row::Row;
use common::model::ChatId;

/// How a row's phone cell is compared with a recipient's registered phone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhoneMatch {
    /// The row phone contains the registered phone anywhere. A short
    /// registered number can match unrelated longer numbers.
    Substring,
    /// Digits-only equality, so `+998 90 123-45-67` equals `998901234567`.
    Normalized,
}

impl PhoneMatch {
    pub fn matches(self, row_phone: &str, registered: &str) -> bool {
        match self {
            PhoneMatch::Substring => {
                let registered = registered.trim();
                !registered.is_empty() && row_phone.contains(registered)
            }
            PhoneMatch::Normalized => {
                let registered = digits(registered);
                !registered.is_empty() && digits(row_phone) == registered
            }
        }
    }
}

fn digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Rows addressed to one chat.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub chat_id: ChatId,
    pub rows: Vec<Row>,
}

pub fn rows_for_phone(rows: &[Row], registered: &str, mode: PhoneMatch) -> Vec<Row> {
    rows.iter()
        .filter(|row| {
            row.phone()
                .is_some_and(|phone| mode.matches(&phone, registered))
        })
        .cloned()
        .collect()
}

/// Pairs every recipient with its matching rows; recipients without a match
/// are left out.
pub fn match_recipients<'a, I>(recipients: I, rows: &[Row], mode: PhoneMatch) -> Vec<Delivery>
where
    I: IntoIterator<Item = &'a Recipient>,
{
    recipients
        .into_iter()
        .filter_map(|recipient| {
            let matched = rows_for_phone(rows, &recipient.phone_number, mode);
            (!matched.is_empty()).then_some(Delivery {
                chat_id: recipient.chat_id,
                rows: matched,
            })
        })
        .collect()
}
