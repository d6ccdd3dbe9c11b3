pub mod exam_controller;

pub use exam_controller::ExamSessionController;
