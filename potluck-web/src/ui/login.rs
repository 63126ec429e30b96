use yew::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct LoginInfo {
    pub host: String,
    pub user: String,
    pub pass: String,
}

#[derive(Clone, PartialEq, Properties)]
pub struct LoginProps {
    pub host: Option<String>,
    pub on_submit: Callback<LoginInfo>,
}

pub struct Login {
    host: String,
    user: String,
    pass: String,
}

pub enum LoginMsg {
    HostChanged(String),
    UserChanged(String),
    PassChanged(String),
    SubmitClicked,
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            host: ctx.props().host.clone().unwrap_or_default(),
            user: String::new(),
            pass: String::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::HostChanged(h) => self.host = h,
            LoginMsg::UserChanged(u) => self.user = u,
            LoginMsg::PassChanged(p) => self.pass = p,
            LoginMsg::SubmitClicked => {
                ctx.props().on_submit.emit(LoginInfo {
                    host: self.host.clone(),
                    user: self.user.clone(),
                    pass: std::mem::take(&mut self.pass),
                });
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    LoginMsg::$msg(input.value())
                })
            };
        }
        html! {
            <form class="login-form d-flex gap-2 my-3" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                LoginMsg::SubmitClicked
            })}>
                <input
                    type="url"
                    class="form-control"
                    aria-label="Host"
                    placeholder="https://example.org"
                    value={self.host.clone()}
                    onchange={callback_for!(HostChanged)}
                />
                <input
                    type="text"
                    class="form-control"
                    aria-label="Username"
                    placeholder="user"
                    value={self.user.clone()}
                    onchange={callback_for!(UserChanged)}
                />
                <input
                    type="password"
                    class="form-control"
                    aria-label="Password"
                    placeholder="password"
                    value={self.pass.clone()}
                    onchange={callback_for!(PassChanged)}
                />
                <button type="submit" class="btn btn-primary">{ "Log in" }</button>
            </form>
        }
    }
}
