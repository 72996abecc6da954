mod dashboard_vm;
mod markdown;
mod material_vm;
mod quiz_vm;
mod time_fmt;

pub use dashboard_vm::{
    AttemptRowVm, StatVm, format_percentage, map_attempt_row, map_attempt_rows, map_stats,
};
pub use markdown::{markdown_to_html, sanitize_html};
pub use material_vm::{MaterialCardVm, map_material_card, map_material_cards, tags_field_value};
pub use quiz_vm::{
    AnswerInputVm, NavigatorItemVm, QuestionVm, QuizCardVm, ResultRowVm, current_question_vm,
    map_quiz_card, map_quiz_cards, navigator_items, progress_label, questions_label, result_rows,
    score_headline, type_mix_rows,
};
pub use time_fmt::{format_date, format_datetime, format_optional_datetime};
