use super::types::{EvaluationKind, ItemRubric, Rubric, SectionRubric};
use crate::scoring::ItemMode;

use ItemMode::{AvailabilityOnly, QualityOnly, Weighted};

/// Item id, label, marks and scoring mode.
type Item = (&'static str, &'static str, f64, ItemMode);

fn section(id: &str, title: &str, max_marks: f64, items: &[Item]) -> SectionRubric {
    SectionRubric {
        id: id.to_string(),
        title: title.to_string(),
        max_marks,
        items: items
            .iter()
            .map(|(id, label, marks, mode)| ItemRubric {
                id: id.to_string(),
                label: label.to_string(),
                marks: *marks,
                mode: *mode,
            })
            .collect(),
    }
}

const INFRASTRUCTURE_CLASSROOMS: &[Item] = &[
    ("lighting", "Lighting and ventilation", 1.0, Weighted),
    ("furniture", "Desk and chair for every trainee", 1.0, Weighted),
    ("boards", "Writing boards", 0.5, Weighted),
    ("power", "Power sockets", 0.5, AvailabilityOnly),
    ("cleanliness", "Cleanliness", 1.0, QualityOnly),
    ("accessibility", "Access for trainees with disabilities", 1.0, Weighted),
];

const INFRASTRUCTURE_WORKSHOPS: &[Item] = &[
    ("space", "Adequate working space", 1.5, Weighted),
    ("safety_signage", "Safety signage", 1.0, Weighted),
    ("fire_extinguishers", "Serviced fire extinguishers", 1.0, AvailabilityOnly),
    ("first_aid", "First aid kit", 1.0, AvailabilityOnly),
    ("storage", "Tool storage", 0.5, Weighted),
    ("waste_disposal", "Waste disposal", 1.0, QualityOnly),
];

const INFRASTRUCTURE_SANITATION: &[Item] = &[
    ("water_supply", "Clean water supply", 1.0, Weighted),
    ("toilets_male", "Male toilets", 1.0, Weighted),
    ("toilets_female", "Female toilets", 1.0, Weighted),
    ("handwashing", "Handwashing points", 0.5, AvailabilityOnly),
    ("drainage", "Drainage", 0.5, QualityOnly),
];

const INFRASTRUCTURE_GROUNDS: &[Item] = &[
    ("fencing", "Perimeter fence and gate", 1.0, Weighted),
    ("signboard", "Institution signboard", 0.5, AvailabilityOnly),
    ("playground", "Sports and recreation area", 1.0, Weighted),
    ("parking", "Parking", 0.5, Weighted),
];

const IT_HARDWARE: &[Item] = &[
    ("computers", "Computers per trainee", 2.0, Weighted),
    ("projector", "Projector", 1.0, Weighted),
    ("printer", "Printer", 0.5, Weighted),
    ("ups", "UPS units", 0.5, AvailabilityOnly),
    ("lab_layout", "Computer lab layout", 1.0, QualityOnly),
];

const IT_CONNECTIVITY: &[Item] = &[
    ("internet", "Internet connection", 1.5, Weighted),
    ("lan", "Local area network", 1.0, Weighted),
    ("wifi_policy", "Acceptable use policy", 0.5, AvailabilityOnly),
];

const IT_SOFTWARE: &[Item] = &[
    ("licensed_os", "Licensed operating systems", 1.0, AvailabilityOnly),
    ("office_suite", "Office suite", 1.0, Weighted),
    ("antivirus", "Antivirus", 0.5, AvailabilityOnly),
    ("trade_software", "Trade specific software", 0.5, Weighted),
];

const IT_MANAGEMENT: &[Item] = &[
    ("it_technician", "ICT technician", 1.0, AvailabilityOnly),
    ("asset_register", "ICT asset register", 1.0, Weighted),
    ("maintenance_log", "Maintenance log", 0.5, Weighted),
    ("backup", "Data backup", 0.5, QualityOnly),
];

const TRADES_CURRICULUM: &[Item] = &[
    ("training_plan", "Training plan", 1.0, Weighted),
    ("schemes_of_work", "Schemes of work", 1.0, Weighted),
    ("lesson_plans", "Lesson plans", 1.0, Weighted),
    ("assessment_records", "Assessment records", 1.0, Weighted),
];

const TRADES_EQUIPMENT: &[Item] = &[
    ("tools", "Hand tools", 2.0, Weighted),
    ("consumables", "Training consumables", 1.0, Weighted),
    ("machinery", "Machinery", 1.5, Weighted),
    ("inventory", "Inventory records", 0.5, AvailabilityOnly),
];

const TRADES_TRAINERS: &[Item] = &[
    ("qualified_trainers", "Qualified trainers", 1.5, AvailabilityOnly),
    ("trainer_ratio", "Trainer to trainee ratio", 1.0, QualityOnly),
    ("cpd_records", "Professional development records", 0.5, Weighted),
];

const TRADES_INDUSTRY_LINKS: &[Item] = &[
    ("attachment_placements", "Industrial attachment placements", 1.5, Weighted),
    ("industry_partners", "Industry partners", 1.0, Weighted),
    ("tracer_study", "Graduate tracer study", 0.5, AvailabilityOnly),
];

const HEADTEACHER_LEADERSHIP: &[Item] = &[
    ("school_vision", "Vision and mission displayed", 1.0, Weighted),
    ("development_plan", "Institutional development plan", 1.0, Weighted),
    ("staff_meetings", "Staff meeting minutes", 1.0, Weighted),
    ("board_minutes", "Board of governors minutes", 1.0, Weighted),
    ("delegation", "Delegation of duties", 1.0, QualityOnly),
];

const HEADTEACHER_TEACHING: &[Item] = &[
    ("timetable", "Master timetable", 1.0, Weighted),
    ("lesson_observation", "Lesson observation records", 1.0, Weighted),
    ("exam_analysis", "Examination analysis", 1.0, Weighted),
    ("syllabus_coverage", "Syllabus coverage records", 1.0, Weighted),
    ("trainee_attendance", "Trainee attendance registers", 1.0, Weighted),
];

const HEADTEACHER_FINANCE: &[Item] = &[
    ("budget", "Approved budget", 1.0, Weighted),
    ("books_of_accounts", "Books of accounts", 1.0, Weighted),
    ("audit_reports", "Audit reports", 1.0, Weighted),
    ("fee_register", "Fee register", 0.5, Weighted),
    ("procurement_committee", "Procurement committee", 0.5, AvailabilityOnly),
];

const HEADTEACHER_WELFARE: &[Item] = &[
    ("guidance_counselling", "Guidance and counselling", 1.0, Weighted),
    ("health_records", "Health records", 0.5, Weighted),
    ("discipline_records", "Discipline records", 0.5, Weighted),
    ("clubs", "Clubs and societies", 0.5, AvailabilityOnly),
    ("meals", "Meals", 0.5, QualityOnly),
];

const HEADTEACHER_COMMUNITY: &[Item] = &[
    ("parents_meetings", "Parents meetings", 1.0, Weighted),
    ("community_projects", "Community projects", 1.0, Weighted),
    ("alumni", "Alumni association", 0.5, AvailabilityOnly),
    ("complaints_register", "Complaints register", 0.5, Weighted),
];

/// Rubric shipped with the binary for the given kind.
pub fn builtin_rubric(kind: EvaluationKind) -> Rubric {
    match kind {
        EvaluationKind::Infrastructure => infrastructure(),
        EvaluationKind::It => it(),
        EvaluationKind::Trades => trades(),
        EvaluationKind::Headteacher => headteacher(),
    }
}

fn infrastructure() -> Rubric {
    Rubric {
        kind: EvaluationKind::Infrastructure,
        title: "Physical Infrastructure".to_string(),
        sections: vec![
            section("classrooms", "Classrooms", 5.0, INFRASTRUCTURE_CLASSROOMS),
            section("workshops", "Workshops", 6.0, INFRASTRUCTURE_WORKSHOPS),
            section("sanitation", "Water and Sanitation", 4.0, INFRASTRUCTURE_SANITATION),
            section("grounds", "Grounds and Security", 3.0, INFRASTRUCTURE_GROUNDS),
        ],
    }
}

fn it() -> Rubric {
    Rubric {
        kind: EvaluationKind::It,
        title: "ICT Facilities".to_string(),
        sections: vec![
            section("hardware", "Hardware", 5.0, IT_HARDWARE),
            section("connectivity", "Connectivity", 3.0, IT_CONNECTIVITY),
            section("software", "Software", 3.0, IT_SOFTWARE),
            section("management", "ICT Management", 3.0, IT_MANAGEMENT),
        ],
    }
}

fn trades() -> Rubric {
    Rubric {
        kind: EvaluationKind::Trades,
        title: "Trade Areas".to_string(),
        sections: vec![
            section("curriculum", "Curriculum Delivery", 4.0, TRADES_CURRICULUM),
            section("equipment", "Tools and Equipment", 5.0, TRADES_EQUIPMENT),
            section("trainers", "Trainers", 3.0, TRADES_TRAINERS),
            section("industry_links", "Industry Linkages", 3.0, TRADES_INDUSTRY_LINKS),
        ],
    }
}

fn headteacher() -> Rubric {
    Rubric {
        kind: EvaluationKind::Headteacher,
        title: "Headteacher Performance".to_string(),
        sections: vec![
            section("leadership", "Leadership and Governance", 5.0, HEADTEACHER_LEADERSHIP),
            section("teaching_learning", "Teaching and Learning", 5.0, HEADTEACHER_TEACHING),
            section("finance", "Financial Management", 4.0, HEADTEACHER_FINANCE),
            section("welfare", "Trainee Welfare", 3.0, HEADTEACHER_WELFARE),
            section("community", "Community Relations", 3.0, HEADTEACHER_COMMUNITY),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::validate_rubric;

    #[test]
    fn test_builtin_rubrics_are_valid() {
        for kind in EvaluationKind::ALL {
            let rubric = builtin_rubric(kind);
            assert_eq!(rubric.kind, kind);
            assert!(validate_rubric(&rubric).is_ok(), "{} rubric invalid", kind);
        }
    }

    #[test]
    fn test_builtin_allocations_fill_their_maxima() {
        for kind in EvaluationKind::ALL {
            for section in builtin_rubric(kind).sections {
                assert_eq!(section.allocated(), section.max_marks, "{}/{}", kind, section.id);
            }
        }
    }

    #[test]
    fn test_builtin_totals() {
        assert_eq!(builtin_rubric(EvaluationKind::Infrastructure).max_marks(), 18.0);
        assert_eq!(builtin_rubric(EvaluationKind::It).max_marks(), 14.0);
        assert_eq!(builtin_rubric(EvaluationKind::Trades).max_marks(), 15.0);
        assert_eq!(builtin_rubric(EvaluationKind::Headteacher).max_marks(), 20.0);
    }
}
