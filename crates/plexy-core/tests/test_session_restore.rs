use std::cell::RefCell;
use std::rc::Rc;

use plexy_core::controller::{DropEvent, SessionArgs, Viewport};
use plexy_core::{
    Controller, ControllerCatalog, ControllerHandle, DesktopView, DesktopWidget, Point, Rect,
    WidgetHandle,
};

/// A sticky-notes style controller that owns a list of note widgets.
struct NotesController {
    name: RefCell<String>,
    notes: RefCell<Vec<WidgetHandle>>,
    restored_args: RefCell<Option<SessionArgs>>,
}

impl NotesController {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(String::new()),
            notes: RefCell::new(Vec::new()),
            restored_args: RefCell::new(None),
        })
    }

    fn new_note(&self, id: &str) -> WidgetHandle {
        let note = DesktopWidget::new(id)
            .owned_by(self.name.borrow().as_str())
            .sized(120.0, 80.0)
            .into_handle();
        self.notes.borrow_mut().push(note.clone());
        note
    }
}

impl Controller for NotesController {
    fn default_view(&self) -> Option<WidgetHandle> {
        None
    }

    fn set_viewport(&self, _viewport: &Viewport) {}

    fn set_controller_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
    }

    fn controller_name(&self) -> String {
        self.name.borrow().clone()
    }

    fn set_view_rect(&self, _rect: Rect) {}

    fn revoke_session(&self, args: &SessionArgs) {
        *self.restored_args.borrow_mut() = Some(args.clone());
    }

    fn delete_widget(&self, widget: &WidgetHandle) -> bool {
        let before = self.notes.borrow().len();
        self.notes
            .borrow_mut()
            .retain(|note| !Rc::ptr_eq(note, widget));
        before != self.notes.borrow().len()
    }

    fn handle_drop_event(&self, _widget: &WidgetHandle, _event: &DropEvent) {}
}

fn view_with(notes: &Rc<NotesController>) -> DesktopView {
    let controller = notes.clone();
    let catalog =
        ControllerCatalog::new().with("notes", move || Ok(controller.clone() as ControllerHandle));
    DesktopView::new(catalog, Viewport::new(vec![Rect::new(0.0, 0.0, 1280.0, 800.0)]))
}

#[test]
fn test_session_survives_restart() {
    // First run: user places two notes, moves one, closes the other.
    let notes = NotesController::new();
    let mut view = view_with(&notes);
    let saved = Rc::new(RefCell::new(String::new()));
    let sink = saved.clone();
    view.subscribe(move |xml| *sink.borrow_mut() = xml.to_string());

    view.add_controller("notes", true).unwrap();
    view.record_controller_rect("notes", Rect::new(0.0, 0.0, 400.0, 300.0));
    view.record_argument("notes", "color", "yellow");

    let shopping = notes.new_note("shopping");
    let todo = notes.new_note("todo");
    view.add_widget_to_view(shopping, Point::new(10.0, 10.0));
    view.add_widget_to_view(todo, Point::new(200.0, 10.0));
    view.record_widget_location("notes", Point::new(50.0, 60.0), "shopping");
    assert!(view.close_widget("todo"));
    assert_eq!(notes.notes.borrow().len(), 1);

    let session = saved.borrow().clone();
    assert!(session.contains("<state id=\"todo\" state=\"1\"/>"));

    // Restart: the controller recreates both notes, the session removes the
    // closed one and moves the other back.
    let notes = NotesController::new();
    let mut view = view_with(&notes);
    view.add_controller("notes", true).unwrap();
    let shopping = notes.new_note("shopping");
    let todo = notes.new_note("todo");
    view.add_widget_to_view(shopping.clone(), Point::default());
    view.add_widget_to_view(todo.clone(), Point::default());

    view.restore(&session, false);

    assert_eq!(shopping.borrow().position(), Point::new(50.0, 60.0));
    assert!(!view.scene().contains("todo"));
    assert!(!todo.borrow().is_visible());
    assert_eq!(notes.notes.borrow().len(), 1);
    assert_eq!(
        notes.restored_args.borrow().as_ref().unwrap()["color"],
        "yellow"
    );
    assert_eq!(view.controller_names(), vec!["notes"]);
    assert_eq!(view.document().len(), 1);
}
