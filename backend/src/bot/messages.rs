//! User-facing texts.

use crate::pipeline::upsert::UpsertReport;
use std::fmt::Display;

pub const WELCOME: &str =
    "Assalomu alaykum! Excel (.xlsx) fayl yuboring. Adminlar faylni ko'rib chiqadi.";
pub const SHARE_CONTACT: &str =
    "Assalomu alaykum! Ro'yxatdan o'tish uchun telefon raqamingizni yuboring.";
pub const ALREADY_REGISTERED: &str = "Siz allaqachon ro'yxatdan o'tgansiz.";
pub const OWN_CONTACT_ONLY: &str =
    "Iltimos, tugma orqali o'zingizning telefon raqamingizni yuboring.";
pub const REGISTERED: &str = "✅ Ro'yxatdan muvaffaqiyatli o'tdingiz!";
pub const PHONE_MISSING: &str = "Telefon raqami topilmadi. Iltimos, kontaktingizni qaytadan yuboring.";
pub const REGISTRATION_FAILED: &str =
    "Ro'yxatdan o'tishda xatolik yuz berdi. Birozdan so'ng qayta urinib ko'ring.";

pub const ONLY_XLSX: &str = "Iltimos, faqat .xlsx formatdagi fayl yuboring.";
pub const DUPLICATE_UPLOAD: &str = "⚠️ Bu fayl allaqachon qayta ishlangan.";
pub const UPLOAD_RECEIVED: &str =
    "Faylingiz qabul qilindi. Adminlar tez orada siz bilan bog'lanadi.";
pub const RECIPIENT_INTRO: &str = "Admin tomonidan fayl yuklandi. Mana ma'lumotlar:";

pub const USERS_HEADER: &str = "Ro'yxatdagi foydalanuvchilar:";
pub const USERS_EMPTY: &str = "Ro'yxatda hali foydalanuvchi yo'q.";
pub const USERS_UNAVAILABLE: &str = "Foydalanuvchilar ro'yxatini olib bo'lmadi.";

pub const SEND_USAGE: &str = "/send <user_id> <xabar>";
pub const SEND_OK: &str = "Xabar yuborildi ✅";

pub fn upload_notice(mention: &str) -> String {
    format!("User {} fayl yubordi.", mention)
}

pub fn failure(error: impl Display) -> String {
    format!("Xatolik: {}", error)
}

pub fn upload_summary(rows: usize, upsert: &UpsertReport, notified: usize) -> String {
    format!(
        "✅ Fayl qayta ishlandi.\n\
         Qatorlar: {}\n\
         Yangi yozuvlar: {}\n\
         Avvaldan mavjud: {}\n\
         To'liq bo'lmagan qatorlar: {}\n\
         Saqlanmagan (xatolik): {}\n\
         Ma'lumot yuborilgan foydalanuvchilar: {}",
        rows, upsert.inserted, upsert.duplicates, upsert.malformed, upsert.failed, notified
    )
}
