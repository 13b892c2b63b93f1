//! Operator-language (Arabic) strings. Business logic works on enums; these
//! are only applied when building responses and audit labels.

use crate::entities::{ActionKind, AssistanceCategory, Role};
use crate::policy::{EntityKind, View};

pub const INVALID_CREDENTIALS: &str = "البريد الإلكتروني أو كلمة المرور غير صحيحة";
pub const EMAIL_UNCONFIRMED: &str = "يجب تفعيل البريد الإلكتروني أولاً";
pub const NETWORK_FAILURE: &str = "خطأ في الاتصال بالإنترنت. يرجى المحاولة مرة أخرى";
pub const LOGIN_FAILED: &str = "فشل تسجيل الدخول";
pub const PROFILE_NOT_PROVISIONED: &str = "حساب المستخدم غير موجود في النظام";
pub const PROFILE_LOOKUP_FAILED: &str = "خطأ في تحميل بيانات المستخدم";
pub const SIGN_IN_REQUIRED: &str = "يجب تسجيل الدخول أولاً";
pub const ACCESS_DENIED: &str = "ليست لديك صلاحية لتنفيذ هذه العملية";
pub const MISSING_FIELDS: &str = "جميع الحقول مطلوبة";
pub const UNEXPECTED_ERROR: &str = "حدث خطأ غير متوقع";
pub const CONFIRM_DELETE: &str = "يجب تأكيد الحذف قبل التنفيذ";
pub const NOT_FOUND: &str = "السجل غير موجود";
pub const UNKNOWN_STATUS: &str = "الحالة المختارة غير معروفة";

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "مدير النظام",
        Role::Manager => "مدير اللجنة",
        Role::Employee => "موظف",
    }
}

pub fn role_mismatch(actual: &Role) -> String {
    format!(
        "هذا الحساب مخصص لـ {}. يرجى اختيار نوع الحساب الصحيح وإعادة المحاولة.",
        role_label(*actual)
    )
}

pub fn view_label(view: View) -> &'static str {
    match view {
        View::Users => "إدارة المستخدمين",
        View::Regions => "المناطق",
        View::Families => "إدارة الأسر",
        View::AssistanceTypes => "المساعدات",
        View::Inventory => "المخزون",
        View::Tasks => "المهام",
        View::Reports => "التقارير",
        View::OperationLogs => "سجل العمليات",
        View::MyTasks => "مهامي",
        View::MyDeliveries => "تسليماتي",
    }
}

pub fn category_label(category: AssistanceCategory) -> &'static str {
    match category {
        AssistanceCategory::Food => "غذائية",
        AssistanceCategory::Financial => "مالية",
        AssistanceCategory::Medical => "طبية",
        AssistanceCategory::Educational => "تعليمية",
        AssistanceCategory::Other => "أخرى",
    }
}

fn entity_noun(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Users => "مستخدم",
        EntityKind::Regions => "منطقة",
        EntityKind::Families => "أسرة",
        EntityKind::AssistanceTypes => "مساعدة",
        EntityKind::Inventory => "مخزون",
        EntityKind::Tasks => "مهمة",
        EntityKind::Deliveries => "تسليم",
        EntityKind::OperationLogs => "سجل",
    }
}

/// Human label stored with an audit row, e.g. "تعديل منطقة".
pub fn action_label(kind: ActionKind, entity: EntityKind) -> String {
    let verb = match kind {
        ActionKind::Create => "إضافة",
        ActionKind::Update => "تعديل",
        ActionKind::Delete => "حذف",
        ActionKind::Other => "عملية على",
    };
    format!("{verb} {}", entity_noun(entity))
}

pub fn field_required(field: &str) -> String {
    format!("الحقل {field} مطلوب")
}

pub fn field_below_minimum(field: &str, min: i64) -> String {
    format!("يجب أن تكون قيمة {field} {min} على الأقل")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_labels_match_dashboard_wording() {
        assert_eq!(action_label(ActionKind::Create, EntityKind::Families), "إضافة أسرة");
        assert_eq!(action_label(ActionKind::Update, EntityKind::Regions), "تعديل منطقة");
        assert_eq!(action_label(ActionKind::Delete, EntityKind::Users), "حذف مستخدم");
    }

    #[test]
    fn mismatch_names_the_actual_role() {
        assert!(role_mismatch(&Role::Manager).contains("مدير اللجنة"));
    }
}
